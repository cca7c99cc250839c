//! # Board Prep Core
//!
//! Shared logic for Board Prep: meeting data models, the overlapping
//! window chunker, keyword extraction, agenda-item reconstruction, and the
//! lexical relevance scorer.
//!
//! This crate performs no filesystem I/O. The application crate reads
//! manifests and markdown, persists the index, and hands plain strings and
//! records to the functions here.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Documents, chunks, agenda items, evidence |
//! | [`chunk`] | Overlapping window chunker |
//! | [`keywords`] | Stop-word filtered keyword extraction |
//! | [`agenda`] | Agenda item reconstruction from segment metadata |
//! | [`search`] | Lexical scoring, filters, ranking |
//! | [`provider`] | `KnowledgeProvider` trait and in-memory corpus |
//! | [`retrieval`] | Intent-driven evidence retrieval and citations |

pub mod agenda;
pub mod chunk;
pub mod keywords;
pub mod models;
pub mod provider;
pub mod retrieval;
pub mod search;
