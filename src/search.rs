//! `prep search`: ranked lexical search over one meeting.

use anyhow::Result;
use std::path::Path;

use board_prep_core::search::{Evidence, SearchFilters};

use crate::config::Config;
use crate::corpus::MeetingCorpus;

/// Options for [`run_search`], mirroring the CLI flags.
#[derive(Debug, Default)]
pub struct SearchOptions {
    pub document_type: Option<String>,
    pub item: Option<String>,
    pub limit: Option<usize>,
    pub explain: bool,
    pub json: bool,
}

pub fn run_search(
    config: &Config,
    meeting_dir: &Path,
    query: &str,
    opts: SearchOptions,
) -> Result<()> {
    let corpus = MeetingCorpus::new(meeting_dir, &config.corpus);
    // an indexing failure must not read as "No results."
    corpus.try_index_corpus(false)?;
    let filters = SearchFilters {
        document_type: opts.document_type,
        agenda_item_id: opts.item,
    };
    let top_k = opts.limit.unwrap_or(config.retrieval.default_top_k);
    let results = corpus.search_with(query, &filters, top_k, opts.explain);

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        print_result(i + 1, result);
    }
    Ok(())
}

fn print_result(rank: usize, result: &Evidence) {
    let title = if result.metadata.segment_title.is_empty() {
        "(untitled)"
    } else {
        result.metadata.segment_title.as_str()
    };
    println!(
        "{}. [{:.2}] {} / {}",
        rank, result.relevance_score, result.source_type, title
    );
    println!("    file: {}", result.file_path);
    if let Some(ref pages) = result.metadata.page_range {
        println!("    pages: {}", pages);
    }
    println!("    excerpt: \"{}\"", snippet(&result.content, 160));
    if let Some(ref ex) = result.explain {
        println!(
            "    explain: phrase={:.2} words={:.2} keywords={:.2} type={:.2} raw={:.2} length={:.2}",
            ex.phrase_bonus, ex.word_score, ex.keyword_bonus, ex.type_bonus, ex.raw_score, ex.length_factor
        );
    }
    println!("    id: {}", result.chunk_id);
    println!();
}

/// Single-line excerpt of at most `max_chars` characters.
pub(crate) fn snippet(content: &str, max_chars: usize) -> String {
    let flat = content.replace('\n', " ");
    let flat = flat.trim();
    if flat.chars().count() <= max_chars {
        flat.to_string()
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}
