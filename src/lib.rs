//! # Board Prep
//!
//! Meeting document indexing and evidence retrieval for municipal board
//! preparation.
//!
//! Board Prep reads a meeting directory of pre-converted markdown segments
//! and their manifest, reconstructs the agenda, chunks every document, and
//! answers lexical searches with ranked [`Evidence`](board_prep_core::search::Evidence)
//! that a downstream answer generator can cite.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌────────────┐
//! │ markdown/    │──▶│ Agenda + Chunker │──▶│ .index/     │
//! │ metadata.json│   │ + Keywords       │   │ JSON/JSONL  │
//! └──────────────┘   └──────────────────┘   └─────┬──────┘
//!                                                 │
//!                                                 ▼
//!                                          ┌────────────┐
//!                                          │ Search /   │
//!                                          │ Retrieval  │
//!                                          └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! prep index ./meetings/2024-05-01
//! prep items ./meetings/2024-05-01
//! prep search ./meetings/2024-05-01 "farm stand permit"
//! prep evidence ./meetings/2024-05-01 "tell me about item 5B"
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`corpus`] | Meeting directory indexer and `KnowledgeProvider` |
//! | [`index_store`] | Flat-file index persistence |
//! | [`ingest`] | `prep index` command |
//! | [`search`] | `prep search` command |
//! | [`get`] | Document and agenda item lookup |
//! | [`evidence`] | `prep evidence` command |
//! | [`stats`] | Corpus statistics |
//! | [`logging`] | Tracing subscriber setup |

pub mod config;
pub mod corpus;
pub mod evidence;
pub mod get;
pub mod index_store;
pub mod ingest;
pub mod logging;
pub mod search;
pub mod stats;
