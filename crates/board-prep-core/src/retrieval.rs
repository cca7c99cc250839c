//! Intent-driven evidence retrieval.
//!
//! Turns a staff member's question into one or more searches against a
//! [`KnowledgeProvider`], merges the hits, and packages them with
//! [`Citation`]s and a confidence estimate. Answer generation from the
//! evidence happens outside this crate.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::provider::KnowledgeProvider;
use crate::search::{Evidence, SearchFilters};

/// Evidence cap after merging searches.
pub const DEFAULT_MAX_EVIDENCE: usize = 8;

const CITATION_TEXT_CHARS: usize = 200;
const MATCHED_INTENT_CONFIDENCE: f64 = 0.8;

/// What kind of question is being asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    AgendaOverview,
    SpecificItem,
    DocumentSearch,
    ParticipantInfo,
    Procedural,
    General,
}

static INTENT_PATTERNS: LazyLock<Vec<(QueryIntent, Vec<Regex>)>> = LazyLock::new(|| {
    let compile = |patterns: &[&str]| -> Vec<Regex> {
        patterns
            .iter()
            .map(|p| Regex::new(p).expect("static regex"))
            .collect()
    };
    vec![
        (
            QueryIntent::AgendaOverview,
            compile(&[
                r"what'?s?\s+on\s+(the\s+)?agenda",
                r"agenda\s+(overview|summary|items)",
                r"what\s+(is\s+)?being\s+discussed",
                r"meeting\s+(agenda|overview|summary)",
            ]),
        ),
        (
            QueryIntent::SpecificItem,
            compile(&[
                r"agenda\s+item\s+\d+[a-z]?",
                r"item\s+\d+[a-z]?",
                r"section\s+\d+[a-z]?",
                r"tell\s+me\s+about.*item",
            ]),
        ),
        (
            QueryIntent::DocumentSearch,
            compile(&[
                r"what\s+documents?",
                r"find.*document",
                r"search.*for",
                r"related\s+to.*document",
            ]),
        ),
        (
            QueryIntent::ParticipantInfo,
            compile(&[
                r"who\s+(is\s+|needs?\s+to\s+)?speak",
                r"applicant",
                r"presenter",
                r"who\s+(is\s+)?involved",
            ]),
        ),
        (
            QueryIntent::Procedural,
            compile(&[
                r"when\s+(is\s+|does)",
                r"what\s+time",
                r"deadline",
                r"process\s+for",
            ]),
        ),
    ]
});

static ITEM_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"item\s+(\d+[a-z]?)").expect("static regex"));
static TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{3,}\b").expect("static regex"));

const QUESTION_STOP_WORDS: [&str; 12] = [
    "what", "who", "when", "where", "why", "how", "the", "and", "for", "about", "tell", "me",
];

/// Result of classifying a question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentAnalysis {
    pub intent: QueryIntent,
    pub confidence: f64,
    /// Uppercased agenda item id for specific-item questions (e.g. `"5B"`).
    pub item_id: Option<String>,
    pub search_terms: Vec<String>,
}

/// Classify a question by the first matching intent pattern group.
pub fn analyze_intent(question: &str) -> IntentAnalysis {
    let lower = question.to_lowercase();

    let intent = INTENT_PATTERNS
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|re| re.is_match(&lower)))
        .map(|(intent, _)| *intent)
        .unwrap_or(QueryIntent::General);

    let confidence = if intent == QueryIntent::General {
        0.0
    } else {
        MATCHED_INTENT_CONFIDENCE
    };

    let item_id = if intent == QueryIntent::SpecificItem {
        ITEM_ID_RE
            .captures(&lower)
            .map(|caps| caps[1].to_uppercase())
    } else {
        None
    };

    let search_terms = TERM_RE
        .find_iter(question)
        .map(|m| m.as_str())
        .filter(|term| !QUESTION_STOP_WORDS.contains(&term.to_lowercase().as_str()))
        .map(str::to_string)
        .collect();

    IntentAnalysis {
        intent,
        confidence,
        item_id,
        search_terms,
    }
}

/// A structured reference to one piece of evidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    /// Knowledge source label (`"meeting"`).
    pub source: String,
    pub file_path: String,
    /// Excerpt of the cited chunk.
    pub text: String,
    pub anchor: Option<String>,
    pub start_char: Option<usize>,
    pub end_char: Option<usize>,
    pub chunk_id: Option<String>,
    pub confidence: Option<f64>,
}

impl Citation {
    pub fn from_evidence(evidence: &Evidence) -> Self {
        let text = if evidence.content.chars().count() > CITATION_TEXT_CHARS {
            let head: String = evidence.content.chars().take(CITATION_TEXT_CHARS).collect();
            format!("{}...", head)
        } else {
            evidence.content.clone()
        };
        Self {
            source: "meeting".to_string(),
            file_path: evidence.file_path.clone(),
            text,
            anchor: evidence.anchor.clone(),
            start_char: evidence.start_char,
            end_char: evidence.end_char,
            chunk_id: Some(evidence.chunk_id.clone()),
            confidence: Some(evidence.relevance_score),
        }
    }
}

/// Evidence gathered for one question.
#[derive(Debug, Clone, Serialize)]
pub struct Retrieval {
    pub question: String,
    pub intent: IntentAnalysis,
    pub evidence: Vec<Evidence>,
    pub citations: Vec<Citation>,
    pub confidence: f64,
}

/// Run the searches appropriate to the question's intent.
///
/// Overview questions pull the overview document plus individual items;
/// specific-item questions search for the item id and the question; all
/// others run one broad search. Hits are merged by chunk id (first
/// occurrence wins), ranked, and capped at `max_evidence`.
pub fn retrieve_evidence<P>(provider: &P, question: &str, max_evidence: usize) -> Retrieval
where
    P: KnowledgeProvider + ?Sized,
{
    let intent = analyze_intent(question);
    let any = SearchFilters::default();
    let mut evidence: Vec<Evidence> = Vec::new();

    match intent.intent {
        QueryIntent::AgendaOverview => {
            evidence.extend(provider.search(question, &SearchFilters::by_document_type("index"), 3));
            evidence.extend(provider.search(
                "agenda items meeting summary",
                &SearchFilters::by_document_type("agenda_item"),
                5,
            ));
        }
        QueryIntent::SpecificItem => {
            if let Some(ref item_id) = intent.item_id {
                evidence.extend(provider.search(&format!("item {}", item_id), &any, 5));
            }
            evidence.extend(provider.search(question, &any, 5));
        }
        _ => evidence.extend(provider.search(question, &any, 10)),
    }

    let mut seen = HashSet::new();
    evidence.retain(|e| seen.insert(e.chunk_id.clone()));
    evidence.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(Ordering::Equal)
    });
    evidence.truncate(max_evidence);

    debug!(
        intent = ?intent.intent,
        evidence = evidence.len(),
        "retrieved evidence"
    );

    let citations = evidence.iter().map(Citation::from_evidence).collect();
    let confidence = calculate_confidence(&evidence, intent.intent);

    Retrieval {
        question: question.to_string(),
        intent,
        evidence,
        citations,
        confidence,
    }
}

/// Confidence in `[0, 0.9]` from evidence quantity and mean score.
pub fn calculate_confidence(evidence: &[Evidence], intent: QueryIntent) -> f64 {
    if evidence.is_empty() {
        return 0.0;
    }

    let avg = evidence.iter().map(|e| e.relevance_score).sum::<f64>() / evidence.len() as f64;
    let targeted = matches!(
        intent,
        QueryIntent::AgendaOverview | QueryIntent::SpecificItem
    );

    let mut confidence = if targeted && avg > 2.0 {
        (avg / 5.0).min(0.9)
    } else {
        (avg / 4.0).min(0.8)
    };

    if evidence.len() < 3 {
        confidence *= 0.8;
    }

    (confidence * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChunkMetadata, DocumentKind, DocumentRecord};
    use crate::provider::InMemoryCorpus;

    fn evidence(id: &str, score: f64, content: &str) -> Evidence {
        Evidence {
            chunk_id: id.to_string(),
            file_path: "x.md".to_string(),
            content: content.to_string(),
            relevance_score: score,
            source_type: "agenda_item".to_string(),
            metadata: ChunkMetadata {
                document_type: DocumentKind::AgendaItem,
                filename: "x.md".to_string(),
                chunk_index: 0,
                page_range: None,
                segment_title: String::new(),
                source_file: String::new(),
                anchor: None,
            },
            anchor: None,
            start_char: Some(0),
            end_char: Some(content.len()),
            explain: None,
        }
    }

    fn meeting() -> InMemoryCorpus {
        let corpus = InMemoryCorpus::new("meeting_test");
        corpus.add_document(
            DocumentRecord::new("index.md"),
            "# Meeting Documents\n\nThe agenda covers the farm stand permit and road paving.",
        );
        corpus.add_document(
            DocumentRecord::new("packet--5-B-permit.md"),
            "Item 5B. The applicant requests a farm stand permit on Route 9.",
        );
        corpus.add_document(
            DocumentRecord::new("packet--6-A-roads.md"),
            "Item 6A. Road paving contract award for Elm Street.",
        );
        corpus
    }

    #[test]
    fn test_intent_overview() {
        let a = analyze_intent("What's on the agenda tonight?");
        assert_eq!(a.intent, QueryIntent::AgendaOverview);
        assert_eq!(a.confidence, 0.8);
        assert_eq!(a.item_id, None);
    }

    #[test]
    fn test_intent_specific_item() {
        let a = analyze_intent("Tell me about item 5b");
        assert_eq!(a.intent, QueryIntent::SpecificItem);
        assert_eq!(a.item_id.as_deref(), Some("5B"));
    }

    #[test]
    fn test_intent_order_first_group_wins() {
        // matches both overview and specific-item patterns
        let a = analyze_intent("agenda items and item 4");
        assert_eq!(a.intent, QueryIntent::AgendaOverview);
        assert_eq!(a.item_id, None);
    }

    #[test]
    fn test_intent_general() {
        let a = analyze_intent("budget numbers");
        assert_eq!(a.intent, QueryIntent::General);
        assert_eq!(a.confidence, 0.0);
    }

    #[test]
    fn test_intent_other_groups() {
        assert_eq!(
            analyze_intent("who needs to speak").intent,
            QueryIntent::ParticipantInfo
        );
        assert_eq!(
            analyze_intent("what documents are there").intent,
            QueryIntent::DocumentSearch
        );
        assert_eq!(
            analyze_intent("what time does it start").intent,
            QueryIntent::Procedural
        );
    }

    #[test]
    fn test_search_terms() {
        let a = analyze_intent("Tell me about the Route 9 farm stand");
        assert_eq!(a.search_terms, vec!["Route", "farm", "stand"]);
    }

    #[test]
    fn test_citation_truncates() {
        let long = "a".repeat(300);
        let c = Citation::from_evidence(&evidence("c1", 1.5, &long));
        assert_eq!(c.text.chars().count(), 203);
        assert_eq!(c.source, "meeting");
        assert_eq!(c.chunk_id.as_deref(), Some("c1"));
        assert_eq!(c.confidence, Some(1.5));
    }

    #[test]
    fn test_confidence() {
        assert_eq!(calculate_confidence(&[], QueryIntent::General), 0.0);

        let strong: Vec<Evidence> = (0..3).map(|i| evidence(&i.to_string(), 4.0, "x")).collect();
        assert_eq!(calculate_confidence(&strong, QueryIntent::SpecificItem), 0.8);
        assert_eq!(calculate_confidence(&strong, QueryIntent::General), 0.8);

        let weak = vec![evidence("a", 1.0, "x")];
        // min(0.8, 0.25) * 0.8
        assert_eq!(calculate_confidence(&weak, QueryIntent::General), 0.2);
    }

    #[test]
    fn test_retrieve_specific_item() {
        let corpus = meeting();
        let r = retrieve_evidence(&corpus, "Tell me about item 5B", DEFAULT_MAX_EVIDENCE);
        assert_eq!(r.intent.intent, QueryIntent::SpecificItem);
        assert!(!r.evidence.is_empty());
        assert_eq!(r.evidence[0].file_path, "packet--5-B-permit.md");
        assert_eq!(r.citations.len(), r.evidence.len());

        let mut ids: Vec<&str> = r.evidence.iter().map(|e| e.chunk_id.as_str()).collect();
        let before = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn test_retrieve_overview_prefers_index() {
        let corpus = meeting();
        let r = retrieve_evidence(&corpus, "what's on the agenda?", DEFAULT_MAX_EVIDENCE);
        assert_eq!(r.intent.intent, QueryIntent::AgendaOverview);
        assert_eq!(r.evidence[0].source_type, "index");
    }

    #[test]
    fn test_retrieve_caps_evidence() {
        let corpus = meeting();
        let r = retrieve_evidence(&corpus, "permit paving farm road", 1);
        assert_eq!(r.evidence.len(), 1);
    }

    #[test]
    fn test_retrieve_nothing() {
        let corpus = meeting();
        let r = retrieve_evidence(&corpus, "library hours", DEFAULT_MAX_EVIDENCE);
        assert!(r.evidence.is_empty());
        assert_eq!(r.confidence, 0.0);
    }
}
