//! # Board Prep CLI (`prep`)
//!
//! The `prep` binary indexes a meeting directory and queries it.
//!
//! ## Usage
//!
//! ```bash
//! prep [--config ./prep.toml] [--verbose] <command> <MEETING_DIR> ...
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `prep index <dir>` | Build the meeting index (`--force` to rebuild) |
//! | `prep search <dir> "<query>"` | Ranked search over chunks |
//! | `prep items <dir>` | List reconstructed agenda items |
//! | `prep item <dir> <id>` | Show one agenda item |
//! | `prep get <dir> <filename>` | Show a document and its chunks |
//! | `prep stats <dir>` | Document/chunk counts and index size |
//! | `prep evidence <dir> "<question>"` | Intent-driven evidence with citations |
//! | `prep completions <shell>` | Print shell completions |

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use board_prep::search::SearchOptions;
use board_prep::{config, evidence, get, ingest, logging, search, stats};

/// Board Prep CLI: index municipal board meeting documents and retrieve
/// evidence for meeting preparation.
///
/// Configuration is optional; without `--config` the built-in defaults
/// apply.
#[derive(Parser)]
#[command(
    name = "prep",
    about = "Board Prep: meeting document indexing and evidence retrieval",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Index a meeting directory.
    ///
    /// Reads `markdown/metadata.json`, reconstructs agenda items, chunks
    /// every document, and writes `.index/`. A no-op when a matching index
    /// already exists, unless `--force` is given.
    Index {
        /// Meeting directory.
        meeting_dir: PathBuf,

        /// Rebuild even if the meeting is already indexed.
        #[arg(long)]
        force: bool,
    },

    /// Search a meeting's documents.
    ///
    /// Indexes the meeting first if needed, then prints ranked results.
    Search {
        /// Meeting directory.
        meeting_dir: PathBuf,

        /// The search query string.
        query: String,

        /// Only return chunks of this document type
        /// (`index`, `administrative`, `minutes`, `agenda`, `agenda_item`).
        #[arg(long = "type")]
        document_type: Option<String>,

        /// Only return chunks whose filename contains this agenda item id.
        #[arg(long)]
        item: Option<String>,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<usize>,

        /// Show the score breakdown for each result.
        #[arg(long)]
        explain: bool,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List reconstructed agenda items.
    Items {
        /// Meeting directory.
        meeting_dir: PathBuf,

        /// Print items as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show one agenda item by id (e.g. `5B`).
    Item {
        /// Meeting directory.
        meeting_dir: PathBuf,

        /// Agenda item id or number.
        id: String,
    },

    /// Show a document and its chunks.
    Get {
        /// Meeting directory.
        meeting_dir: PathBuf,

        /// Markdown filename as listed in the manifest.
        filename: String,
    },

    /// Show corpus statistics.
    Stats {
        /// Meeting directory.
        meeting_dir: PathBuf,
    },

    /// Gather evidence for a natural-language question.
    ///
    /// Detects the question's intent, runs the matching searches, and
    /// prints deduplicated evidence with citations and a confidence score.
    Evidence {
        /// Meeting directory.
        meeting_dir: PathBuf,

        /// The question to answer.
        question: String,

        /// Print the retrieval as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "prep", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Index { meeting_dir, force } => {
            ingest::run_index(&cfg, &meeting_dir, force)?;
        }
        Commands::Search {
            meeting_dir,
            query,
            document_type,
            item,
            limit,
            explain,
            json,
        } => {
            search::run_search(
                &cfg,
                &meeting_dir,
                &query,
                SearchOptions {
                    document_type,
                    item,
                    limit,
                    explain,
                    json,
                },
            )?;
        }
        Commands::Items { meeting_dir, json } => {
            get::run_items(&cfg, &meeting_dir, json)?;
        }
        Commands::Item { meeting_dir, id } => {
            get::run_item(&cfg, &meeting_dir, &id)?;
        }
        Commands::Get {
            meeting_dir,
            filename,
        } => {
            get::run_get(&cfg, &meeting_dir, &filename)?;
        }
        Commands::Stats { meeting_dir } => {
            stats::run_stats(&cfg, &meeting_dir)?;
        }
        Commands::Evidence {
            meeting_dir,
            question,
            json,
        } => {
            evidence::run_evidence(&cfg, &meeting_dir, &question, json)?;
        }
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
