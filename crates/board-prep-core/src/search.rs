//! Lexical relevance scoring and ranking.
//!
//! Every query scans every chunk; there is no inverted index and no cache
//! between calls. Meeting corpora are a few hundred chunks, so a linear
//! scan is fast enough and keeps ranking fully deterministic.
//!
//! # Scoring
//!
//! For a lowercased query `q` and chunk content `c`:
//!
//! 1. `+3.0` if `q` occurs verbatim in `c`.
//! 2. For each whitespace-separated query word of 3+ characters:
//!    `+min(occurrences × 0.5, 2.0)`.
//! 3. `+1.0` per (query word, chunk keyword) pair where the word is a
//!    substring of the keyword.
//! 4. `+2.0` for the overview (`index`) document when `q` mentions
//!    "agenda", "what" or "overview"; otherwise `+1.5` for `agenda_item`
//!    chunks when `q` mentions "item" or "specific".
//! 5. Divide by `sqrt(len(c) / 1000)`.
//!
//! Chunks scoring zero are not results. Ties keep the chunk collection's
//! insertion order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Chunk, ChunkMetadata, DocumentKind};

const PHRASE_BONUS: f64 = 3.0;
const WORD_WEIGHT: f64 = 0.5;
const WORD_CAP: f64 = 2.0;
const MIN_WORD_CHARS: usize = 3;
const KEYWORD_BONUS: f64 = 1.0;
const OVERVIEW_BONUS: f64 = 2.0;
const ITEM_BONUS: f64 = 1.5;
const OVERVIEW_TRIGGERS: [&str; 3] = ["agenda", "what", "overview"];
const ITEM_TRIGGERS: [&str; 2] = ["item", "specific"];

/// Optional restrictions on which chunks may be returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Exact match against the chunk's document type (e.g. `"index"`).
    pub document_type: Option<String>,
    /// Substring match against the chunk's owning filename.
    pub agenda_item_id: Option<String>,
}

impl SearchFilters {
    pub fn by_document_type(document_type: impl Into<String>) -> Self {
        Self {
            document_type: Some(document_type.into()),
            ..Default::default()
        }
    }

    pub fn by_agenda_item(item_id: impl Into<String>) -> Self {
        Self {
            agenda_item_id: Some(item_id.into()),
            ..Default::default()
        }
    }

    /// Build filters from loose key/value pairs. Unrecognised keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut filters = Self::default();
        for (key, value) in pairs {
            match key.as_ref() {
                "document_type" => filters.document_type = Some(value.into()),
                "agenda_item_id" => filters.agenda_item_id = Some(value.into()),
                other => debug!(filter = other, "ignoring unknown search filter"),
            }
        }
        filters
    }

    pub fn is_empty(&self) -> bool {
        self.document_type.is_none() && self.agenda_item_id.is_none()
    }

    pub fn matches(&self, chunk: &Chunk) -> bool {
        if let Some(ref doc_type) = self.document_type {
            if chunk.metadata.document_type.as_str() != doc_type {
                return false;
            }
        }
        if let Some(ref item_id) = self.agenda_item_id {
            if !chunk.metadata.filename.contains(item_id.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Per-component breakdown of a chunk's score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreExplanation {
    pub phrase_bonus: f64,
    pub word_score: f64,
    pub keyword_bonus: f64,
    pub type_bonus: f64,
    /// Sum of the components before length normalization.
    pub raw_score: f64,
    /// `sqrt(len / 1000)`, or `1.0` for empty content.
    pub length_factor: f64,
    pub score: f64,
}

/// A ranked search hit, ready for citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub chunk_id: String,
    pub file_path: String,
    pub content: String,
    pub relevance_score: f64,
    /// The chunk's document type (`"index"`, `"agenda_item"`, ...).
    pub source_type: String,
    pub metadata: ChunkMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(default)]
    pub start_char: Option<usize>,
    #[serde(default)]
    pub end_char: Option<usize>,
    /// Scoring breakdown (populated when `explain` is requested).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain: Option<ScoreExplanation>,
}

impl Evidence {
    pub fn from_chunk(chunk: &Chunk, score: f64, explain: Option<ScoreExplanation>) -> Self {
        Self {
            chunk_id: chunk.chunk_id.clone(),
            file_path: chunk.file_path.clone(),
            content: chunk.content.clone(),
            relevance_score: score,
            source_type: chunk.metadata.document_type.as_str().to_string(),
            metadata: chunk.metadata.clone(),
            anchor: chunk.metadata.anchor.clone(),
            start_char: Some(chunk.start_char),
            end_char: Some(chunk.end_char),
            explain,
        }
    }
}

/// Score one chunk against a query.
pub fn score_chunk(query: &str, chunk: &Chunk) -> ScoreExplanation {
    let query = query.to_lowercase();
    let content = chunk.content.to_lowercase();
    let words: Vec<&str> = query.split_whitespace().collect();

    let phrase_bonus = if content.contains(query.as_str()) {
        PHRASE_BONUS
    } else {
        0.0
    };

    let word_score: f64 = words
        .iter()
        .filter(|w| w.chars().count() >= MIN_WORD_CHARS)
        .map(|w| word_frequency_score(content.matches(*w).count()))
        .sum();

    let keyword_bonus: f64 = chunk
        .keywords
        .iter()
        .map(|kw| {
            let kw = kw.to_lowercase();
            words.iter().filter(|w| kw.contains(**w)).count() as f64 * KEYWORD_BONUS
        })
        .sum();

    let type_bonus = match chunk.metadata.document_type {
        DocumentKind::Index if OVERVIEW_TRIGGERS.iter().any(|t| query.contains(t)) => {
            OVERVIEW_BONUS
        }
        DocumentKind::AgendaItem if ITEM_TRIGGERS.iter().any(|t| query.contains(t)) => ITEM_BONUS,
        _ => 0.0,
    };

    let raw_score = phrase_bonus + word_score + keyword_bonus + type_bonus;
    let char_len = chunk.content.chars().count();
    let length_factor = if char_len > 0 {
        (char_len as f64 / 1000.0).sqrt()
    } else {
        1.0
    };

    ScoreExplanation {
        phrase_bonus,
        word_score,
        keyword_bonus,
        type_bonus,
        raw_score,
        length_factor,
        score: raw_score / length_factor,
    }
}

/// Frequency contribution of one query word: `min(count × 0.5, 2.0)`.
pub fn word_frequency_score(occurrences: usize) -> f64 {
    (occurrences as f64 * WORD_WEIGHT).min(WORD_CAP)
}

/// Rank `chunks` against `query`, returning at most `top_k` results.
///
/// `chunks` must be iterated in a stable order (insertion order); equal
/// scores keep that order. A blank query matches nothing.
pub fn search_chunks<'a, I>(
    chunks: I,
    query: &str,
    filters: &SearchFilters,
    top_k: usize,
    explain: bool,
) -> Vec<Evidence>
where
    I: IntoIterator<Item = &'a Chunk>,
{
    // An empty phrase would match every chunk and earn each the phrase bonus.
    if top_k == 0 || query.trim().is_empty() {
        return Vec::new();
    }

    let mut results: Vec<Evidence> = chunks
        .into_iter()
        .filter(|chunk| filters.matches(chunk))
        .filter_map(|chunk| {
            let breakdown = score_chunk(query, chunk);
            if breakdown.score > 0.0 {
                Some(Evidence::from_chunk(
                    chunk,
                    breakdown.score,
                    explain.then_some(breakdown),
                ))
            } else {
                None
            }
        })
        .collect();

    // sort_by is stable, so ties keep insertion order
    results.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(Ordering::Equal)
    });
    results.truncate(top_k);
    results
}
