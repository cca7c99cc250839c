//! `prep index`: build or rebuild a meeting index and print the report.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::corpus::MeetingCorpus;

pub fn run_index(config: &Config, meeting_dir: &Path, force: bool) -> Result<()> {
    let corpus = MeetingCorpus::new(meeting_dir, &config.corpus);
    let report = corpus.try_index_corpus(force)?;

    println!("index {}", report.corpus_id);
    if report.skipped_rebuild {
        println!("  already indexed (use --force to rebuild)");
        println!("ok");
        return Ok(());
    }

    println!("  documents indexed: {}", report.documents_indexed);
    println!("  chunks created: {}", report.chunks_created);
    println!("  agenda items: {}", report.agenda_items);
    if !report.skipped.is_empty() {
        println!("  skipped: {}", report.skipped.len());
        for skip in &report.skipped {
            let note = if skip.chunked { " (document indexed)" } else { "" };
            println!("    {}: {}{}", skip.filename, skip.reason, note);
        }
    }
    println!("  index: {}", corpus.index_dir().display());
    println!("ok");
    Ok(())
}
