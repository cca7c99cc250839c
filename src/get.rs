//! Document and agenda item lookup.
//!
//! Backs `prep get`, `prep items` and `prep item`. Each command indexes the
//! meeting first if no usable index exists.

use anyhow::{bail, Result};
use serde::Serialize;
use std::path::Path;

use board_prep_core::models::{AgendaItem, Chunk, Document, DocumentKind};
use board_prep_core::provider::KnowledgeProvider;

use crate::config::Config;
use crate::corpus::MeetingCorpus;

/// A document together with its chunks.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResponse {
    pub document: Document,
    pub chunks: Vec<Chunk>,
}

fn open_indexed(config: &Config, meeting_dir: &Path) -> Result<MeetingCorpus> {
    let corpus = MeetingCorpus::new(meeting_dir, &config.corpus);
    corpus.try_index_corpus(false)?;
    Ok(corpus)
}

/// Structured lookup shared by the CLI commands.
pub fn get_document(corpus: &MeetingCorpus, filename: &str) -> Result<DocumentResponse> {
    let Some(document) = corpus.get_document(filename) else {
        bail!("document not found: {}", filename);
    };
    let chunks = corpus.get_chunks(filename);
    Ok(DocumentResponse { document, chunks })
}

pub fn run_get(config: &Config, meeting_dir: &Path, filename: &str) -> Result<()> {
    let corpus = open_indexed(config, meeting_dir)?;
    let doc = get_document(&corpus, filename)?;
    let record = &doc.document.record;

    println!("--- Document ---");
    println!("filename:     {}", doc.document.filename);
    println!(
        "title:        {}",
        record.segment_title.as_deref().unwrap_or("(untitled)")
    );
    println!(
        "type:         {}",
        DocumentKind::from_filename(&doc.document.filename)
    );
    if let Some(ref pages) = record.page_range {
        println!("pages:        {}", pages);
    }
    if let Some(ref source) = record.source_file {
        println!("source_file:  {}", source);
    }
    println!("path:         {}", doc.document.path);
    println!();

    println!("--- Body ---");
    println!("{}", doc.document.content);
    println!();

    println!("--- Chunks ({}) ---", doc.chunks.len());
    for chunk in &doc.chunks {
        println!(
            "[chunk {}] chars {}..{} keywords: {}",
            chunk.metadata.chunk_index,
            chunk.start_char,
            chunk.end_char,
            chunk.keywords.join(", ")
        );
        println!("{}", chunk.content);
        println!();
    }

    Ok(())
}

pub fn run_items(config: &Config, meeting_dir: &Path, json: bool) -> Result<()> {
    let corpus = open_indexed(config, meeting_dir)?;
    let items = corpus.get_agenda_items();

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No agenda items.");
        return Ok(());
    }

    println!("{:<6} {:<18} {:<8}  TITLE", "ITEM", "SECTION", "PAGES");
    println!("{}", "-".repeat(76));
    for item in &items {
        println!(
            "{:<6} {:<18} {:<8}  {}",
            item.item_number,
            item.section,
            item.page_range.as_deref().unwrap_or("-"),
            item.title
        );
    }
    Ok(())
}

pub fn run_item(config: &Config, meeting_dir: &Path, item_id: &str) -> Result<()> {
    let corpus = open_indexed(config, meeting_dir)?;
    let Some(item) = corpus.get_agenda_item(item_id) else {
        bail!("agenda item not found: {}", item_id);
    };
    print_item(&item);
    Ok(())
}

fn print_item(item: &AgendaItem) {
    println!("--- Agenda Item {} ---", item.item_number);
    println!("title:        {}", item.title);
    println!("section:      {}", item.section);
    println!("markdown:     {}", item.markdown_file);
    if let Some(ref pdf) = item.pdf_segment {
        println!("pdf_segment:  {}", pdf);
    }
    if let Some(ref pages) = item.page_range {
        println!("pages:        {}", pages);
    }
    if let Some(count) = item.page_count {
        println!("page_count:   {}", count);
    }
    println!("keywords:     {}", item.keywords.join(", "));
    if let Some(ref desc) = item.description {
        println!();
        println!("{}", desc);
    }
}
