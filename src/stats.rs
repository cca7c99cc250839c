//! Corpus statistics.
//!
//! Quick summary of what a meeting index holds: document and chunk counts,
//! agenda items, pages, and on-disk index size. Used by `prep stats`.

use anyhow::Result;
use std::path::Path;

use board_prep_core::provider::KnowledgeProvider;

use crate::config::Config;
use crate::corpus::MeetingCorpus;
use crate::index_store;

/// Run the stats command: open the corpus and print a summary.
///
/// Does not index; an unindexed meeting reports zero counts.
pub fn run_stats(config: &Config, meeting_dir: &Path) -> Result<()> {
    let corpus = MeetingCorpus::new(meeting_dir, &config.corpus);
    let stats = corpus.get_corpus_stats();
    let size = index_store::index_size_bytes(corpus.index_dir());

    println!("Board Prep - Corpus Stats");
    println!("=========================");
    println!();
    println!("  Corpus:      {}", stats.corpus_id);
    println!("  Meeting:     {}", corpus.meeting_dir().display());
    println!("  Indexed:     {}", if stats.indexed { "yes" } else { "no" });
    println!("  Index size:  {}", format_bytes(size));
    println!();
    println!("  Documents:   {}", stats.document_count);
    println!("  Chunks:      {}", stats.chunk_count);

    if let Some(ctx) = corpus.get_meeting_context() {
        println!("  Agenda items: {}", ctx.agenda_items.len());
        println!("  Pages:       {}", ctx.total_pages);
        println!(
            "  Indexed at:  {}",
            ctx.indexed_at.format("%Y-%m-%d %H:%M UTC")
        );
    }

    println!();
    Ok(())
}

/// Format a byte count as a human-readable string.
pub(crate) fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
