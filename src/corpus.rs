//! Meeting corpus indexer.
//!
//! A [`MeetingCorpus`] owns one meeting directory:
//!
//! ```text
//! <meeting>/
//!   markdown/
//!     metadata.json          manifest: {"documents": [{filename, segment_title, ...}]}
//!     index.md               optional meeting overview
//!     *.md                   one file per document segment
//!     pdf-segments/*.pdf     original PDF segments
//!   .index/
//!     meeting_index.json
//!     chunks.jsonl
//! ```
//!
//! # Lifecycle
//!
//! A corpus starts unindexed. On construction it tries the fast path: if
//! `.index/meeting_index.json` exists and was built from this same
//! directory, the stored chunks are loaded and documents and agenda items
//! are rebuilt from the manifest without re-chunking. Otherwise the first
//! [`index_corpus`](KnowledgeProvider::index_corpus) (or the first search)
//! reads the manifest, reconstructs agenda items, chunks every document,
//! and persists the result.
//!
//! Per-document problems (missing or unreadable markdown, no recoverable
//! agenda item number, a filename listed twice) never fail the batch. The
//! first manifest entry for a filename wins. They are logged and recorded
//! in the [`IndexReport`].

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use board_prep_core::agenda::{build_agenda_item, extract_item_number, find_pdf_segment};
use board_prep_core::chunk::{chunk_document, ChunkParams};
use board_prep_core::keywords::KeywordExtractor;
use board_prep_core::models::{
    AgendaItem, Chunk, Document, DocumentRecord, MeetingContext, MeetingManifest, SkipReason,
};
use board_prep_core::provider::{CorpusStats, KnowledgeProvider};
use board_prep_core::search::{search_chunks, Evidence, SearchFilters};

use crate::config::CorpusConfig;
use crate::index_store::{self, IndexMetadata};

/// A document left out of the index, or whose agenda item could not be built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedDocument {
    pub filename: String,
    pub reason: SkipReason,
    /// `true` when the document itself was still indexed and only its
    /// agenda item was dropped.
    pub chunked: bool,
}

/// Outcome of one indexing run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexReport {
    pub corpus_id: String,
    /// Already indexed and not forced; nothing was rebuilt.
    pub skipped_rebuild: bool,
    pub documents_indexed: usize,
    pub chunks_created: usize,
    pub agenda_items: usize,
    pub skipped: Vec<SkippedDocument>,
}

#[derive(Default)]
struct CorpusState {
    indexed: bool,
    documents: Vec<Document>,
    chunks: Vec<Chunk>,
    agenda_items: Vec<AgendaItem>,
    context: Option<MeetingContext>,
    last_report: Option<IndexReport>,
}

/// Documents, agenda items and (optionally) chunks collected from one
/// pass over the manifest.
struct Collected {
    documents: Vec<Document>,
    agenda_items: Vec<AgendaItem>,
    chunks: Vec<Chunk>,
    skipped: Vec<SkippedDocument>,
}

pub struct MeetingCorpus {
    corpus_id: String,
    meeting_dir: PathBuf,
    markdown_dir: PathBuf,
    index_dir: PathBuf,
    config: CorpusConfig,
    params: ChunkParams,
    extractor: KeywordExtractor,
    state: RwLock<CorpusState>,
}

impl MeetingCorpus {
    /// Open a meeting directory, loading a matching persisted index if one
    /// exists.
    pub fn new(meeting_dir: impl AsRef<Path>, config: &CorpusConfig) -> Self {
        let given = meeting_dir.as_ref();
        let meeting_dir = fs::canonicalize(given).unwrap_or_else(|_| given.to_path_buf());
        let dir_name = meeting_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let corpus = Self {
            corpus_id: format!("meeting_{}", dir_name),
            markdown_dir: meeting_dir.join(&config.markdown_dir),
            index_dir: meeting_dir.join(&config.index_dir),
            meeting_dir,
            config: config.clone(),
            params: config.chunk_params(),
            extractor: config.keyword_extractor(),
            state: RwLock::new(CorpusState::default()),
        };
        corpus.load_existing();
        corpus
    }

    pub fn meeting_dir(&self) -> &Path {
        &self.meeting_dir
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CorpusState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CorpusState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn meeting_dir_key(&self) -> String {
        self.meeting_dir.to_string_lossy().into_owned()
    }

    /// Build (or rebuild) the index, propagating manifest and persistence
    /// errors.
    pub fn try_index_corpus(&self, force_rebuild: bool) -> Result<IndexReport> {
        if self.read_state().indexed && !force_rebuild {
            debug!(corpus = %self.corpus_id, "already indexed, skipping rebuild");
            return Ok(IndexReport {
                corpus_id: self.corpus_id.clone(),
                skipped_rebuild: true,
                ..Default::default()
            });
        }

        let manifest_path = self.markdown_dir.join(&self.config.manifest_file);
        if !manifest_path.exists() {
            bail!("Manifest not found: {}", manifest_path.display());
        }
        let (raw, manifest) = read_manifest(&manifest_path)?;

        info!(
            corpus = %self.corpus_id,
            documents = manifest.documents.len(),
            "indexing meeting documents"
        );
        let collected = self.collect(&manifest, true);

        let indexed_at = Utc::now();
        let metadata = IndexMetadata {
            corpus_id: self.corpus_id.clone(),
            meeting_dir: self.meeting_dir_key(),
            indexed_at,
            document_count: collected.documents.len(),
            chunk_count: collected.chunks.len(),
        };
        index_store::save_index(&self.index_dir, &metadata, &collected.chunks)?;

        let report = IndexReport {
            corpus_id: self.corpus_id.clone(),
            skipped_rebuild: false,
            documents_indexed: collected.documents.len(),
            chunks_created: collected.chunks.len(),
            agenda_items: collected.agenda_items.len(),
            skipped: collected.skipped.clone(),
        };
        info!(
            corpus = %self.corpus_id,
            documents = report.documents_indexed,
            chunks = report.chunks_created,
            agenda_items = report.agenda_items,
            skipped = report.skipped.len(),
            "index complete"
        );

        let context = self.meeting_context(raw, &manifest, &collected, indexed_at);
        let mut state = self.write_state();
        state.indexed = true;
        state.documents = collected.documents;
        state.agenda_items = collected.agenda_items;
        state.chunks = collected.chunks;
        state.context = Some(context);
        state.last_report = Some(report.clone());
        Ok(report)
    }

    /// Fast path: reuse a persisted index built from this directory.
    fn load_existing(&self) {
        let (metadata, chunks) = match index_store::load_index(&self.index_dir) {
            Ok(Some(loaded)) => loaded,
            Ok(None) => return,
            Err(e) => {
                warn!(corpus = %self.corpus_id, "discarding unreadable index: {:#}", e);
                return;
            }
        };

        if metadata.meeting_dir != self.meeting_dir_key() {
            warn!(
                corpus = %self.corpus_id,
                stored = %metadata.meeting_dir,
                "discarding index built from a different directory"
            );
            return;
        }

        let mut state = self.write_state();
        state.chunks = chunks;
        state.indexed = true;

        let manifest_path = self.markdown_dir.join(&self.config.manifest_file);
        match read_manifest(&manifest_path) {
            Ok((raw, manifest)) => {
                let collected = self.collect(&manifest, false);
                state.context =
                    Some(self.meeting_context(raw, &manifest, &collected, metadata.indexed_at));
                state.documents = collected.documents;
                state.agenda_items = collected.agenda_items;
            }
            Err(e) => {
                warn!(corpus = %self.corpus_id, "index loaded without manifest: {:#}", e);
            }
        }

        info!(
            corpus = %self.corpus_id,
            chunks = state.chunks.len(),
            documents = state.documents.len(),
            "loaded existing index"
        );
    }

    /// Walk the manifest, then the optional index document. Chunks are only
    /// built when `build_chunks` is set; the fast path reuses stored ones.
    fn collect(&self, manifest: &MeetingManifest, build_chunks: bool) -> Collected {
        let pdf_candidates = self.pdf_candidates();
        let mut out = Collected {
            documents: Vec::new(),
            agenda_items: Vec::new(),
            chunks: Vec::new(),
            skipped: Vec::new(),
        };

        let mut seen = HashSet::new();
        for record in &manifest.documents {
            if !seen.insert(record.filename.as_str()) {
                warn!(file = %record.filename, "skipping repeated manifest entry");
                out.skipped.push(SkippedDocument {
                    filename: record.filename.clone(),
                    reason: SkipReason::DuplicateFilename,
                    chunked: false,
                });
                continue;
            }

            let path = self.markdown_dir.join(&record.filename);
            let content = match read_markdown(&path) {
                Ok(content) => content,
                Err(reason) => {
                    warn!(file = %record.filename, %reason, "skipping document");
                    out.skipped.push(SkippedDocument {
                        filename: record.filename.clone(),
                        reason,
                        chunked: false,
                    });
                    continue;
                }
            };

            if record.filename != self.config.index_document {
                let pdf_segment = self.resolve_pdf_segment(record, &pdf_candidates);
                match build_agenda_item(
                    record,
                    &content,
                    pdf_segment,
                    &self.extractor,
                    self.config.item_keywords,
                ) {
                    Ok(item) => out.agenda_items.push(item),
                    Err(reason) => {
                        debug!(file = %record.filename, %reason, "no agenda item");
                        out.skipped.push(SkippedDocument {
                            filename: record.filename.clone(),
                            reason,
                            chunked: build_chunks,
                        });
                    }
                }
            }

            self.push_document(&mut out, record.clone(), content, &path, build_chunks);
        }

        let index_path = self.markdown_dir.join(&self.config.index_document);
        let already_listed = out
            .documents
            .iter()
            .any(|d| d.filename == self.config.index_document);
        if index_path.exists() && !already_listed {
            match read_markdown(&index_path) {
                Ok(content) => {
                    let mut record = DocumentRecord::new(self.config.index_document.clone());
                    record.document_type = Some("index".to_string());
                    self.push_document(&mut out, record, content, &index_path, build_chunks);
                }
                Err(reason) => {
                    warn!(file = %self.config.index_document, %reason, "skipping index document");
                    out.skipped.push(SkippedDocument {
                        filename: self.config.index_document.clone(),
                        reason,
                        chunked: false,
                    });
                }
            }
        }

        out
    }

    fn push_document(
        &self,
        out: &mut Collected,
        record: DocumentRecord,
        content: String,
        path: &Path,
        build_chunks: bool,
    ) {
        if build_chunks {
            out.chunks.extend(chunk_document(
                &record.filename,
                &content,
                &record,
                &self.params,
                &self.extractor,
                self.config.chunk_keywords,
            ));
        }
        out.documents.push(Document {
            filename: record.filename.clone(),
            content,
            record,
            path: path.to_string_lossy().into_owned(),
        });
    }

    /// PDF filenames in the segments directory; empty when it is missing.
    fn pdf_candidates(&self) -> Vec<String> {
        let dir = self.markdown_dir.join(&self.config.pdf_segments_dir);
        if !dir.is_dir() {
            return Vec::new();
        }
        WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
            })
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect()
    }

    /// Meeting-relative path of the PDF segment for this record's item.
    fn resolve_pdf_segment(&self, record: &DocumentRecord, candidates: &[String]) -> Option<String> {
        let item_number = extract_item_number(record.title(), &record.filename)?;
        let name = find_pdf_segment(&item_number, candidates)?;
        let relative = Path::new(&self.config.markdown_dir)
            .join(&self.config.pdf_segments_dir)
            .join(name);
        Some(relative.to_string_lossy().into_owned())
    }

    fn meeting_context(
        &self,
        raw: Value,
        manifest: &MeetingManifest,
        collected: &Collected,
        indexed_at: chrono::DateTime<Utc>,
    ) -> MeetingContext {
        let total_pages = manifest
            .documents
            .iter()
            .filter_map(|d| d.page_count)
            .map(u64::from)
            .sum();
        MeetingContext {
            meeting_dir: self.meeting_dir_key(),
            metadata: raw,
            documents: collected.documents.clone(),
            agenda_items: collected.agenda_items.clone(),
            indexed_at,
            total_documents: collected.documents.len(),
            total_pages,
        }
    }

    /// Search with an optional per-result score breakdown. Indexes lazily;
    /// an unindexable corpus yields no results.
    pub fn search_with(
        &self,
        query: &str,
        filters: &SearchFilters,
        top_k: usize,
        explain: bool,
    ) -> Vec<Evidence> {
        if !self.is_indexed() && !self.index_corpus(false) {
            return Vec::new();
        }
        let state = self.read_state();
        let results = search_chunks(&state.chunks, query, filters, top_k, explain);
        debug!(query, results = results.len(), "search complete");
        results
    }

    pub fn get_agenda_items(&self) -> Vec<AgendaItem> {
        self.read_state().agenda_items.clone()
    }

    /// Look up an agenda item by `id` or `item_number`.
    pub fn get_agenda_item(&self, item_id: &str) -> Option<AgendaItem> {
        self.read_state()
            .agenda_items
            .iter()
            .find(|item| item.id == item_id || item.item_number == item_id)
            .cloned()
    }

    pub fn get_meeting_context(&self) -> Option<MeetingContext> {
        self.read_state().context.clone()
    }

    /// Chunks belonging to one document, in index order.
    pub fn get_chunks(&self, filename: &str) -> Vec<Chunk> {
        self.read_state()
            .chunks
            .iter()
            .filter(|c| c.file_path == filename)
            .cloned()
            .collect()
    }

    /// Report from the last rebuild in this process, if any.
    pub fn last_report(&self) -> Option<IndexReport> {
        self.read_state().last_report.clone()
    }
}

impl KnowledgeProvider for MeetingCorpus {
    fn corpus_id(&self) -> &str {
        &self.corpus_id
    }

    fn is_indexed(&self) -> bool {
        self.read_state().indexed
    }

    fn index_corpus(&self, force_rebuild: bool) -> bool {
        match self.try_index_corpus(force_rebuild) {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(corpus = %self.corpus_id, "indexing failed: {:#}", e);
                false
            }
        }
    }

    fn search(&self, query: &str, filters: &SearchFilters, top_k: usize) -> Vec<Evidence> {
        self.search_with(query, filters, top_k, false)
    }

    fn get_document(&self, filename: &str) -> Option<Document> {
        self.read_state()
            .documents
            .iter()
            .find(|d| d.filename == filename)
            .cloned()
    }

    fn get_corpus_stats(&self) -> CorpusStats {
        let state = self.read_state();
        let bytes = index_store::index_size_bytes(&self.index_dir);
        CorpusStats {
            corpus_id: self.corpus_id.clone(),
            indexed: state.indexed,
            document_count: state.documents.len(),
            chunk_count: state.chunks.len(),
            index_size_mb: bytes as f64 / (1024.0 * 1024.0),
        }
    }
}

/// Read the manifest as both the raw JSON value and typed records.
fn read_manifest(path: &Path) -> Result<(Value, MeetingManifest)> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid manifest JSON: {}", path.display()))?;
    let manifest: MeetingManifest = serde_json::from_value(value.clone())
        .with_context(|| format!("Unexpected manifest layout: {}", path.display()))?;
    Ok((value, manifest))
}

fn read_markdown(path: &Path) -> std::result::Result<String, SkipReason> {
    if !path.exists() {
        return Err(SkipReason::MissingMarkdown {
            path: path.display().to_string(),
        });
    }
    fs::read_to_string(path).map_err(|e| SkipReason::Unreadable {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
