//! Core data models for meeting corpora.
//!
//! These types describe what flows from the upstream conversion step (the
//! manifest and its [`DocumentRecord`]s) through indexing ([`Document`],
//! [`Chunk`], [`AgendaItem`]) into the aggregate [`MeetingContext`].
//! Query-time types live in [`crate::search`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The per-meeting manifest written by the conversion step (`metadata.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeetingManifest {
    #[serde(default)]
    pub documents: Vec<DocumentRecord>,
    /// Any other top-level manifest fields (meeting name, processing date, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One document entry in the meeting manifest.
///
/// Only `filename` is required. Fields the conversion step adds that are
/// not modelled here are preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_title: Option<String>,
    /// Page span in the source PDF, e.g. `"22-27"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentRecord {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }

    /// The segment title, or `""` when the record has none.
    pub fn title(&self) -> &str {
        self.segment_title.as_deref().unwrap_or("")
    }
}

/// Document category, derived from the markdown filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// The meeting overview page.
    Index,
    Administrative,
    Minutes,
    Agenda,
    /// An individual agenda-item segment (the fallback category).
    AgendaItem,
}

impl DocumentKind {
    /// Classify a markdown filename. Checks run in order; first match wins.
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_lowercase();
        if lower.contains("index.md") {
            DocumentKind::Index
        } else if lower.contains("administrator") {
            DocumentKind::Administrative
        } else if lower.contains("minutes") {
            DocumentKind::Minutes
        } else if lower.contains("agenda") {
            DocumentKind::Agenda
        } else {
            DocumentKind::AgendaItem
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Index => "index",
            DocumentKind::Administrative => "administrative",
            DocumentKind::Minutes => "minutes",
            DocumentKind::Agenda => "agenda",
            DocumentKind::AgendaItem => "agenda_item",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A fully loaded markdown document belonging to a meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique key within a meeting.
    pub filename: String,
    pub content: String,
    pub record: DocumentRecord,
    /// Absolute or meeting-relative path of the markdown file.
    pub path: String,
}

/// Per-chunk metadata carried into search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub document_type: DocumentKind,
    pub filename: String,
    pub chunk_index: usize,
    #[serde(default)]
    pub page_range: Option<String>,
    #[serde(default)]
    pub segment_title: String,
    #[serde(default)]
    pub source_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

/// A window of a document's content, the unit of search.
///
/// `start_char`/`end_char` follow nominal window arithmetic
/// (`index * (chunk_size - overlap)`) and drift from the true offsets once
/// a boundary search moves a cut point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// `{filename}_chunk_{index:03}`.
    pub chunk_id: String,
    /// Owning document filename.
    pub file_path: String,
    pub content: String,
    pub start_char: usize,
    pub end_char: usize,
    pub metadata: ChunkMetadata,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Agenda section, inferred from the segment title or lead paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    #[serde(rename = "ADMINISTRATIVE")]
    Administrative,
    #[serde(rename = "PUBLIC HEARINGS")]
    PublicHearings,
    #[serde(rename = "NEW BUSINESS")]
    NewBusiness,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Administrative => "ADMINISTRATIVE",
            Section::PublicHearings => "PUBLIC HEARINGS",
            Section::NewBusiness => "NEW BUSINESS",
            Section::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A normalized agenda item reconstructed from one markdown segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaItem {
    pub id: String,
    pub section: Section,
    /// e.g. `"5B"`. Same value as `id`.
    pub item_number: String,
    pub title: String,
    pub description: Option<String>,
    pub markdown_file: String,
    /// PDF segment path relative to the meeting directory.
    pub pdf_segment: Option<String>,
    pub page_range: Option<String>,
    pub page_count: Option<u32>,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub metadata: DocumentRecord,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub action_required: bool,
}

/// Why a document or agenda item was left out of an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("no agenda item number in segment title or filename")]
    NoItemNumber,
    #[error("markdown file not found: {path}")]
    MissingMarkdown { path: String },
    #[error("could not read {path}: {message}")]
    Unreadable { path: String, message: String },
    #[error("filename already listed earlier in the manifest")]
    DuplicateFilename,
}

/// Read-only snapshot of one indexed meeting directory.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingContext {
    pub meeting_dir: String,
    /// The raw manifest as read from disk.
    pub metadata: Value,
    pub documents: Vec<Document>,
    pub agenda_items: Vec<AgendaItem>,
    pub indexed_at: DateTime<Utc>,
    pub total_documents: usize,
    pub total_pages: u64,
}
