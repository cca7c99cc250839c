//! TOML configuration.
//!
//! Every field has a default, so a missing `[corpus]` or `[retrieval]`
//! table (or no config file at all) yields the standard layout:
//!
//! ```toml
//! [corpus]
//! chunk_size = 1000
//! chunk_overlap = 200
//! chunk_keywords = 5
//! item_keywords = 10
//! markdown_dir = "markdown"
//! index_dir = ".index"
//! pdf_segments_dir = "pdf-segments"
//! manifest_file = "metadata.json"
//! index_document = "index.md"
//!
//! [retrieval]
//! default_top_k = 10
//! max_evidence = 8
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use board_prep_core::chunk::ChunkParams;
use board_prep_core::keywords::KeywordExtractor;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// Keywords kept per chunk.
    #[serde(default = "default_chunk_keywords")]
    pub chunk_keywords: usize,
    /// Keywords kept per agenda item.
    #[serde(default = "default_item_keywords")]
    pub item_keywords: usize,
    /// Markdown directory, relative to the meeting directory.
    #[serde(default = "default_markdown_dir")]
    pub markdown_dir: String,
    /// Index directory, relative to the meeting directory.
    #[serde(default = "default_index_dir")]
    pub index_dir: String,
    /// PDF segment directory, relative to the markdown directory.
    #[serde(default = "default_pdf_segments_dir")]
    pub pdf_segments_dir: String,
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,
    /// Optional meeting overview page, in the markdown directory.
    #[serde(default = "default_index_document")]
    pub index_document: String,
    /// Replaces the built-in stop-word list when set.
    #[serde(default)]
    pub stop_words: Option<Vec<String>>,
}

fn default_chunk_size() -> usize {
    1000
}
fn default_chunk_overlap() -> usize {
    200
}
fn default_chunk_keywords() -> usize {
    5
}
fn default_item_keywords() -> usize {
    10
}
fn default_markdown_dir() -> String {
    "markdown".to_string()
}
fn default_index_dir() -> String {
    ".index".to_string()
}
fn default_pdf_segments_dir() -> String {
    "pdf-segments".to_string()
}
fn default_manifest_file() -> String {
    "metadata.json".to_string()
}
fn default_index_document() -> String {
    "index.md".to_string()
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            chunk_keywords: default_chunk_keywords(),
            item_keywords: default_item_keywords(),
            markdown_dir: default_markdown_dir(),
            index_dir: default_index_dir(),
            pdf_segments_dir: default_pdf_segments_dir(),
            manifest_file: default_manifest_file(),
            index_document: default_index_document(),
            stop_words: None,
        }
    }
}

impl CorpusConfig {
    pub fn chunk_params(&self) -> ChunkParams {
        ChunkParams {
            chunk_size: self.chunk_size,
            overlap: self.chunk_overlap,
        }
    }

    pub fn keyword_extractor(&self) -> KeywordExtractor {
        match self.stop_words {
            Some(ref words) => KeywordExtractor::new(words),
            None => KeywordExtractor::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
    #[serde(default = "default_max_evidence")]
    pub max_evidence: usize,
}

fn default_top_k() -> usize {
    10
}
fn default_max_evidence() -> usize {
    board_prep_core::retrieval::DEFAULT_MAX_EVIDENCE
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
            max_evidence: default_max_evidence(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.corpus.chunk_size == 0 {
            bail!("corpus.chunk_size must be > 0");
        }
        if self.corpus.chunk_overlap >= self.corpus.chunk_size {
            bail!(
                "corpus.chunk_overlap ({}) must be smaller than corpus.chunk_size ({})",
                self.corpus.chunk_overlap,
                self.corpus.chunk_size
            );
        }
        if self.retrieval.default_top_k < 1 {
            bail!("retrieval.default_top_k must be >= 1");
        }
        if self.retrieval.max_evidence < 1 {
            bail!("retrieval.max_evidence must be >= 1");
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

/// Load `path` when given, otherwise fall back to built-in defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => load_config(p),
        None => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.corpus.chunk_size, 1000);
        assert_eq!(cfg.corpus.chunk_overlap, 200);
        assert_eq!(cfg.corpus.index_dir, ".index");
        assert_eq!(cfg.retrieval.max_evidence, 8);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let file = write_config("[corpus]\nchunk_size = 500\nchunk_overlap = 50\n");
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.corpus.chunk_size, 500);
        assert_eq!(cfg.corpus.chunk_overlap, 50);
        assert_eq!(cfg.corpus.markdown_dir, "markdown");
        assert_eq!(cfg.retrieval.default_top_k, 10);
    }

    #[test]
    fn test_overlap_must_be_smaller() {
        let file = write_config("[corpus]\nchunk_size = 100\nchunk_overlap = 100\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("chunk_overlap"));
    }

    #[test]
    fn test_custom_stop_words() {
        let file = write_config("[corpus]\nstop_words = [\"permit\"]\n");
        let cfg = load_config(file.path()).unwrap();
        let kw = cfg.corpus.keyword_extractor();
        assert_eq!(kw.extract("permit application", 5), vec!["application"]);
    }

    #[test]
    fn test_missing_file() {
        assert!(load_config(Path::new("/nonexistent/prep.toml")).is_err());
        assert!(load_or_default(None).is_ok());
    }
}
