//! `prep evidence`: intent-driven retrieval for a natural-language question.
//!
//! Prints what a downstream answer generator would receive: the detected
//! intent, ranked evidence, citations, and a confidence estimate.

use anyhow::Result;
use std::path::Path;

use board_prep_core::retrieval::retrieve_evidence;

use crate::config::Config;
use crate::corpus::MeetingCorpus;
use crate::search::snippet;

pub fn run_evidence(config: &Config, meeting_dir: &Path, question: &str, json: bool) -> Result<()> {
    let corpus = MeetingCorpus::new(meeting_dir, &config.corpus);
    corpus.try_index_corpus(false)?;
    let retrieval = retrieve_evidence(&corpus, question, config.retrieval.max_evidence);

    if json {
        println!("{}", serde_json::to_string_pretty(&retrieval)?);
        return Ok(());
    }

    println!("question:   {}", retrieval.question);
    println!("intent:     {:?}", retrieval.intent.intent);
    if let Some(ref item) = retrieval.intent.item_id {
        println!("item:       {}", item);
    }
    println!("confidence: {:.2}", retrieval.confidence);
    println!();

    if retrieval.citations.is_empty() {
        println!("No evidence.");
        return Ok(());
    }

    for (i, citation) in retrieval.citations.iter().enumerate() {
        println!(
            "[{}] {} ({:.2})",
            i + 1,
            citation.file_path,
            citation.confidence.unwrap_or_default()
        );
        println!("    \"{}\"", snippet(&citation.text, 200));
    }
    Ok(())
}
