//! Flat-file index persistence.
//!
//! An indexed meeting keeps two files under its index directory:
//!
//! | File | Contents |
//! |------|----------|
//! | `meeting_index.json` | [`IndexMetadata`]: corpus id, source directory, timestamp, counts |
//! | `chunks.jsonl` | One serialized [`Chunk`] per line, in index order |
//!
//! `meeting_dir` in the metadata is the cache-validity key: a stored index
//! is only reused when it was built from the same directory.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use walkdir::WalkDir;

use board_prep_core::models::Chunk;

pub const METADATA_FILE: &str = "meeting_index.json";
pub const CHUNKS_FILE: &str = "chunks.jsonl";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub corpus_id: String,
    pub meeting_dir: String,
    pub indexed_at: DateTime<Utc>,
    pub document_count: usize,
    pub chunk_count: usize,
}

/// Write metadata and chunks, creating the index directory if needed.
pub fn save_index(index_dir: &Path, metadata: &IndexMetadata, chunks: &[Chunk]) -> Result<()> {
    fs::create_dir_all(index_dir)
        .with_context(|| format!("Failed to create index directory: {}", index_dir.display()))?;

    let metadata_path = index_dir.join(METADATA_FILE);
    let json = serde_json::to_string_pretty(metadata)?;
    fs::write(&metadata_path, json)
        .with_context(|| format!("Failed to write {}", metadata_path.display()))?;

    let chunks_path = index_dir.join(CHUNKS_FILE);
    let file = fs::File::create(&chunks_path)
        .with_context(|| format!("Failed to create {}", chunks_path.display()))?;
    let mut writer = BufWriter::new(file);
    for chunk in chunks {
        serde_json::to_writer(&mut writer, chunk)?;
        writer.write_all(b"\n")?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", chunks_path.display()))?;

    tracing::debug!(
        path = %index_dir.display(),
        chunks = chunks.len(),
        "saved index"
    );
    Ok(())
}

/// Read a persisted index. `Ok(None)` unless both files exist; an error when
/// the chunk file disagrees with the recorded chunk count.
pub fn load_index(index_dir: &Path) -> Result<Option<(IndexMetadata, Vec<Chunk>)>> {
    let metadata_path = index_dir.join(METADATA_FILE);
    let chunks_path = index_dir.join(CHUNKS_FILE);
    if !metadata_path.exists() || !chunks_path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(&metadata_path)
        .with_context(|| format!("Failed to read {}", metadata_path.display()))?;
    let metadata: IndexMetadata = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid index metadata: {}", metadata_path.display()))?;

    let file = fs::File::open(&chunks_path)
        .with_context(|| format!("Failed to open {}", chunks_path.display()))?;
    let mut chunks = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let chunk: Chunk = serde_json::from_str(&line).with_context(|| {
            format!("Invalid chunk at {}:{}", chunks_path.display(), line_no + 1)
        })?;
        chunks.push(chunk);
    }

    if chunks.len() != metadata.chunk_count {
        bail!(
            "{} holds {} chunks, metadata records {}",
            chunks_path.display(),
            chunks.len(),
            metadata.chunk_count
        );
    }

    Ok(Some((metadata, chunks)))
}

/// Total size of every file under `index_dir`, recursively. Zero when the
/// directory does not exist.
pub fn index_size_bytes(index_dir: &Path) -> u64 {
    WalkDir::new(index_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_prep_core::chunk::{chunk_document, ChunkParams};
    use board_prep_core::keywords::KeywordExtractor;
    use board_prep_core::models::DocumentRecord;
    use tempfile::TempDir;

    fn sample_metadata(chunk_count: usize) -> IndexMetadata {
        IndexMetadata {
            corpus_id: "meeting_test".to_string(),
            meeting_dir: "/tmp/test".to_string(),
            indexed_at: Utc::now(),
            document_count: 1,
            chunk_count,
        }
    }

    fn sample_chunks() -> Vec<Chunk> {
        let record = DocumentRecord::new("5b-permit.md");
        chunk_document(
            "5b-permit.md",
            "Farm stand permit request for the north parcel.",
            &record,
            &ChunkParams::default(),
            &KeywordExtractor::default(),
            5,
        )
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let index_dir = dir.path().join(".index");
        let chunks = sample_chunks();
        let metadata = sample_metadata(chunks.len());

        save_index(&index_dir, &metadata, &chunks).unwrap();
        let (loaded_meta, loaded_chunks) = load_index(&index_dir).unwrap().unwrap();

        assert_eq!(loaded_meta, metadata);
        assert_eq!(loaded_chunks, chunks);
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(load_index(&dir.path().join(".index")).unwrap().is_none());
    }

    #[test]
    fn test_load_without_chunk_file_is_none() {
        let dir = TempDir::new().unwrap();
        let chunks = sample_chunks();
        save_index(dir.path(), &sample_metadata(chunks.len()), &chunks).unwrap();
        fs::remove_file(dir.path().join(CHUNKS_FILE)).unwrap();

        assert!(load_index(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_chunk_count_mismatch_errors() {
        let dir = TempDir::new().unwrap();
        let chunks = sample_chunks();
        save_index(dir.path(), &sample_metadata(chunks.len() + 1), &chunks).unwrap();

        let err = load_index(dir.path()).unwrap_err();
        assert!(err.to_string().contains("metadata records"));
    }

    #[test]
    fn test_load_corrupt_metadata_errors() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(METADATA_FILE), "{not json").unwrap();
        fs::write(dir.path().join(CHUNKS_FILE), "").unwrap();
        assert!(load_index(dir.path()).is_err());
    }

    #[test]
    fn test_index_size_counts_all_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a"), vec![0u8; 100]).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("b"), vec![0u8; 50]).unwrap();
        assert_eq!(index_size_bytes(dir.path()), 150);
        assert_eq!(index_size_bytes(&dir.path().join("missing")), 0);
    }
}
