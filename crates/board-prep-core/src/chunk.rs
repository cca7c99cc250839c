//! Overlapping window chunker.
//!
//! Splits document content into windows of `chunk_size` characters that
//! overlap by `overlap` characters, so a sentence cut at one boundary is
//! still whole in the neighbouring chunk.
//!
//! # Algorithm
//!
//! 1. Text no longer than `chunk_size` is returned as a single chunk,
//!    untouched.
//! 2. Otherwise take the window `[start, start + chunk_size)`. If its right
//!    edge falls inside the text, look back up to `min(100, chunk_size / 4)`
//!    characters for whitespace or sentence punctuation and cut just after
//!    it (never past the window edge).
//! 3. Trim the window; empty windows are dropped.
//! 4. Advance to `max(start + 1, end - overlap)`. The `start + 1` floor
//!    guarantees progress when the overlap is as large as the window.
//!
//! Lengths and offsets count Unicode scalar values, so a cut never lands
//! inside a multi-byte character.
//!
//! # Example
//!
//! ```rust
//! use board_prep_core::chunk::{split_text, ChunkParams};
//!
//! let pieces = split_text("Short agenda note.", &ChunkParams::default());
//! assert_eq!(pieces, vec!["Short agenda note."]);
//! ```

use crate::keywords::KeywordExtractor;
use crate::models::{Chunk, ChunkMetadata, DocumentKind, DocumentRecord};

/// Characters a window may be cut after.
const BOUNDARY_CHARS: [char; 7] = [' ', '\n', '\t', '.', '!', '?', ';'];

/// Upper bound on the boundary look-back, in characters.
const MAX_LOOKBACK: usize = 100;

/// Window size and overlap, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkParams {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

/// Split `text` into ordered, overlapping pieces.
pub fn split_text(text: &str, params: &ChunkParams) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let size = params.chunk_size.max(1);

    if chars.len() <= size {
        return vec![text.to_string()];
    }

    let lookback = MAX_LOOKBACK.min(size / 4);
    let mut pieces = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let mut end = start + size;

        if end < chars.len() {
            for i in 0..lookback {
                if end - i <= start {
                    break;
                }
                if BOUNDARY_CHARS.contains(&chars[end - i]) {
                    // a boundary right at the edge leaves the window as is
                    end = (end - i + 1).min(start + size);
                    break;
                }
            }
        }

        let window: String = chars[start..end.min(chars.len())].iter().collect();
        let trimmed = window.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed.to_string());
        }

        start = (start + 1).max(end.saturating_sub(params.overlap));
    }

    pieces
}

/// Deterministic chunk identifier: `{filename}_chunk_{index:03}`.
pub fn chunk_id(filename: &str, index: usize) -> String {
    format!("{}_chunk_{:03}", filename, index)
}

/// Chunk one document and annotate each piece with metadata and keywords.
///
/// Offsets use nominal window arithmetic (`index * (chunk_size - overlap)`)
/// rather than the trimmed cut points.
pub fn chunk_document(
    filename: &str,
    content: &str,
    record: &DocumentRecord,
    params: &ChunkParams,
    extractor: &KeywordExtractor,
    max_keywords: usize,
) -> Vec<Chunk> {
    let kind = DocumentKind::from_filename(filename);
    let stride = params.chunk_size.saturating_sub(params.overlap);

    split_text(content, params)
        .into_iter()
        .enumerate()
        .map(|(index, text)| {
            let start_char = index * stride;
            let end_char = start_char + text.chars().count();
            let keywords = extractor.extract(&text, max_keywords);
            Chunk {
                chunk_id: chunk_id(filename, index),
                file_path: filename.to_string(),
                content: text,
                start_char,
                end_char,
                metadata: ChunkMetadata {
                    document_type: kind,
                    filename: filename.to_string(),
                    chunk_index: index,
                    page_range: record.page_range.clone(),
                    segment_title: record.title().to_string(),
                    source_file: record.source_file.clone().unwrap_or_default(),
                    anchor: None,
                },
                keywords,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(chunk_size: usize, overlap: usize) -> ChunkParams {
        ChunkParams {
            chunk_size,
            overlap,
        }
    }

    fn words(n: usize) -> String {
        (0..n)
            .map(|i| format!("word{}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_small_text_single_chunk() {
        let pieces = split_text("Hello, board!", &ChunkParams::default());
        assert_eq!(pieces, vec!["Hello, board!"]);
    }

    #[test]
    fn test_short_text_is_not_trimmed() {
        let pieces = split_text("  padded  ", &ChunkParams::default());
        assert_eq!(pieces, vec!["  padded  "]);
    }

    #[test]
    fn test_empty_text() {
        let pieces = split_text("", &ChunkParams::default());
        assert_eq!(pieces, vec![""]);
    }

    #[test]
    fn test_chunks_respect_size() {
        let text = words(400);
        let pieces = split_text(&text, &params(100, 20));
        assert!(pieces.len() > 1);
        for p in &pieces {
            assert!(p.chars().count() <= 100, "chunk too long: {}", p.len());
        }
    }

    #[test]
    fn test_cuts_on_word_boundary() {
        let text = words(400);
        let pieces = split_text(&text, &params(100, 20));
        // Every full chunk except the tail ends on a complete word.
        for p in &pieces[..pieces.len() - 1] {
            let last = p.split_whitespace().last().unwrap();
            assert!(text.split_whitespace().any(|w| w == last), "split word: {}", last);
        }
    }

    #[test]
    fn test_no_boundary_uses_exact_size() {
        let text = "x".repeat(250);
        let pieces = split_text(&text, &params(100, 0));
        assert_eq!(pieces[0].len(), 100);
        assert_eq!(pieces[1].len(), 100);
        assert_eq!(pieces[2].len(), 50);
    }

    #[test]
    fn test_boundary_at_edge_stays_within_size() {
        let text = format!("{}.{}", "x".repeat(100), "y".repeat(100));
        let pieces = split_text(&text, &params(100, 0));
        assert_eq!(pieces[0], "x".repeat(100));
        assert!(pieces.iter().all(|p| p.chars().count() <= 100));
    }

    #[test]
    fn test_covers_every_word() {
        let text = words(500);
        let pieces = split_text(&text, &params(120, 30));
        for w in text.split_whitespace() {
            assert!(
                pieces.iter().any(|p| p.split_whitespace().any(|pw| pw == w)),
                "word {} missing from all chunks",
                w
            );
        }
    }

    #[test]
    fn test_overlap_larger_than_chunk_terminates() {
        let text = "abcdefghij".repeat(10);
        let pieces = split_text(&text, &params(10, 50));
        assert!(!pieces.is_empty());
        assert!(pieces.len() <= text.len());
    }

    #[test]
    fn test_multibyte_utf8_chars() {
        let text = "┌──────────┐ │ Café ünïcödé │ └──────────┘ ".repeat(20);
        let pieces = split_text(&text, &params(30, 5));
        assert!(pieces.len() > 1);
        for p in &pieces {
            assert!(p.chars().count() <= 30);
        }
    }

    #[test]
    fn test_deterministic() {
        let text = words(300);
        let record = DocumentRecord::new("5b.md");
        let kw = KeywordExtractor::default();
        let c1 = chunk_document("5b.md", &text, &record, &params(100, 20), &kw, 5);
        let c2 = chunk_document("5b.md", &text, &record, &params(100, 20), &kw, 5);
        assert_eq!(c1, c2);
    }

    #[test]
    fn test_chunk_ids_and_sequence() {
        let text = words(300);
        let record = DocumentRecord::new("5b-permit.md");
        let kw = KeywordExtractor::default();
        let chunks = chunk_document("5b-permit.md", &text, &record, &params(100, 20), &kw, 5);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.chunk_id, format!("5b-permit.md_chunk_{:03}", i));
            assert_eq!(c.metadata.chunk_index, i);
            assert_eq!(c.start_char, i * 80);
            assert_eq!(c.end_char, c.start_char + c.content.chars().count());
            assert!(c.keywords.len() <= 5);
        }
    }

    #[test]
    fn test_chunk_metadata_from_record() {
        let mut record = DocumentRecord::new("5b-permit.md");
        record.segment_title = Some("5B - Permit Application".to_string());
        record.page_range = Some("22-27".to_string());
        record.source_file = Some("packet.pdf".to_string());
        let chunks = chunk_document(
            "5b-permit.md",
            "Permit text.",
            &record,
            &ChunkParams::default(),
            &KeywordExtractor::default(),
            5,
        );
        assert_eq!(chunks.len(), 1);
        let meta = &chunks[0].metadata;
        assert_eq!(meta.document_type, DocumentKind::AgendaItem);
        assert_eq!(meta.page_range.as_deref(), Some("22-27"));
        assert_eq!(meta.segment_title, "5B - Permit Application");
        assert_eq!(meta.source_file, "packet.pdf");
        assert_eq!(chunks[0].keywords, vec!["permit", "text"]);
    }
}
