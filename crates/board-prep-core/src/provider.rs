//! Knowledge provider abstraction.
//!
//! [`KnowledgeProvider`] is the surface calling agents use: index a
//! corpus, search it for [`Evidence`], and inspect it. The application
//! crate implements it over a meeting directory on disk; [`InMemoryCorpus`]
//! implements it over documents handed in directly and is used in tests.
//!
//! All methods take `&self`. Implementations guard their in-memory state
//! with a read/write lock so searches can share a corpus while a rebuild
//! takes exclusive access.

use std::sync::{PoisonError, RwLock};

use serde::Serialize;

use crate::chunk::{chunk_document, ChunkParams};
use crate::keywords::KeywordExtractor;
use crate::models::{Chunk, Document, DocumentRecord};
use crate::search::{search_chunks, Evidence, SearchFilters};

/// Summary of what a provider has indexed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusStats {
    pub corpus_id: String,
    pub indexed: bool,
    pub document_count: usize,
    pub chunk_count: usize,
    /// On-disk index size; `0.0` for providers without persistence.
    pub index_size_mb: f64,
}

/// A searchable corpus of documents.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`index_corpus`](KnowledgeProvider::index_corpus) | Build (or rebuild) the index |
/// | [`search`](KnowledgeProvider::search) | Ranked lexical search |
/// | [`get_document`](KnowledgeProvider::get_document) | Fetch a document by filename |
/// | [`get_corpus_stats`](KnowledgeProvider::get_corpus_stats) | Document/chunk counts and size |
pub trait KnowledgeProvider {
    fn corpus_id(&self) -> &str;

    fn is_indexed(&self) -> bool;

    /// Index the corpus. Returns `false` on failure; already indexed and not
    /// forcing is a successful no-op.
    fn index_corpus(&self, force_rebuild: bool) -> bool;

    /// Search for evidence. An empty result means "no evidence", never
    /// "failure".
    fn search(&self, query: &str, filters: &SearchFilters, top_k: usize) -> Vec<Evidence>;

    fn get_document(&self, filename: &str) -> Option<Document>;

    fn get_corpus_stats(&self) -> CorpusStats;
}

#[derive(Default)]
struct MemoryState {
    documents: Vec<Document>,
    chunks: Vec<Chunk>,
}

/// In-memory provider over documents added at runtime.
pub struct InMemoryCorpus {
    corpus_id: String,
    params: ChunkParams,
    extractor: KeywordExtractor,
    chunk_keywords: usize,
    state: RwLock<MemoryState>,
}

impl InMemoryCorpus {
    pub fn new(corpus_id: impl Into<String>) -> Self {
        Self::with_params(corpus_id, ChunkParams::default(), KeywordExtractor::default(), 5)
    }

    pub fn with_params(
        corpus_id: impl Into<String>,
        params: ChunkParams,
        extractor: KeywordExtractor,
        chunk_keywords: usize,
    ) -> Self {
        Self {
            corpus_id: corpus_id.into(),
            params,
            extractor,
            chunk_keywords,
            state: RwLock::new(MemoryState::default()),
        }
    }

    /// Add (or replace) a document and chunk it immediately.
    pub fn add_document(&self, record: DocumentRecord, content: &str) {
        let chunks = chunk_document(
            &record.filename,
            content,
            &record,
            &self.params,
            &self.extractor,
            self.chunk_keywords,
        );
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let filename = record.filename.clone();
        state.documents.retain(|d| d.filename != filename);
        state.chunks.retain(|c| c.file_path != filename);
        state.documents.push(Document {
            filename: filename.clone(),
            content: content.to_string(),
            record,
            path: filename,
        });
        state.chunks.extend(chunks);
    }

    pub fn chunks(&self) -> Vec<Chunk> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .chunks
            .clone()
    }
}

impl KnowledgeProvider for InMemoryCorpus {
    fn corpus_id(&self) -> &str {
        &self.corpus_id
    }

    fn is_indexed(&self) -> bool {
        true
    }

    fn index_corpus(&self, _force_rebuild: bool) -> bool {
        true
    }

    fn search(&self, query: &str, filters: &SearchFilters, top_k: usize) -> Vec<Evidence> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        search_chunks(&state.chunks, query, filters, top_k, false)
    }

    fn get_document(&self, filename: &str) -> Option<Document> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.documents.iter().find(|d| d.filename == filename).cloned()
    }

    fn get_corpus_stats(&self) -> CorpusStats {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        CorpusStats {
            corpus_id: self.corpus_id.clone(),
            indexed: true,
            document_count: state.documents.len(),
            chunk_count: state.chunks.len(),
            index_size_mb: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_search() {
        let corpus = InMemoryCorpus::new("test");
        corpus.add_document(DocumentRecord::new("5b-permit.md"), "Farm stand permit request.");
        corpus.add_document(DocumentRecord::new("6a-roads.md"), "Road paving schedule.");

        let results = corpus.search("permit", &SearchFilters::default(), 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].file_path, "5b-permit.md");
    }

    #[test]
    fn test_replace_document() {
        let corpus = InMemoryCorpus::new("test");
        corpus.add_document(DocumentRecord::new("a.md"), "first version");
        corpus.add_document(DocumentRecord::new("a.md"), "second version");

        let stats = corpus.get_corpus_stats();
        assert_eq!(stats.document_count, 1);
        assert_eq!(stats.chunk_count, 1);
        assert_eq!(corpus.get_document("a.md").unwrap().content, "second version");
    }

    #[test]
    fn test_missing_document() {
        let corpus = InMemoryCorpus::new("test");
        assert!(corpus.get_document("nope.md").is_none());
    }
}
