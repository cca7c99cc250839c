//! Frequency-based keyword extraction.
//!
//! Keywords annotate chunks (up to 5) and agenda items (up to 10) and feed
//! the keyword-overlap bonus in [`crate::search`].
//!
//! # Algorithm
//!
//! 1. Drop markdown punctuation (`#`, `*`, backtick, brackets, parentheses)
//!    and lowercase.
//! 2. Take alphabetic tokens of at least three letters on word boundaries.
//! 3. Discard tokens of three letters or fewer and stop words.
//! 4. Rank by descending frequency; ties keep first-seen order.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{3,}\b").expect("static regex"));

const MARKDOWN_CHARS: [char; 7] = ['#', '*', '`', '[', ']', '(', ')'];

/// Common English words excluded from keyword lists.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "this", "that",
    "these", "those", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "do", "does", "did", "will", "would", "could", "should", "may", "might", "can",
    "shall",
];

/// Stop-word filtered keyword extractor.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    stop_words: HashSet<String>,
}

impl KeywordExtractor {
    /// Build an extractor with a custom stop-word list (matched lowercase).
    pub fn new<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stop_words: stop_words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Return up to `max_keywords` terms, most frequent first.
    pub fn extract(&self, text: &str, max_keywords: usize) -> Vec<String> {
        if max_keywords == 0 {
            return Vec::new();
        }

        let cleaned: String = text
            .chars()
            .filter(|c| !MARKDOWN_CHARS.contains(c))
            .collect::<String>()
            .to_lowercase();

        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut slots: HashMap<String, usize> = HashMap::new();

        for m in WORD_RE.find_iter(&cleaned) {
            let word = m.as_str();
            if word.len() <= 3 || self.is_stop_word(word) {
                continue;
            }
            match slots.get(word) {
                Some(&slot) => counts[slot].1 += 1,
                None => {
                    slots.insert(word.to_string(), counts.len());
                    counts.push((word.to_string(), 1));
                }
            }
        }

        // stable: equal counts stay in first-seen order
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(max_keywords);
        counts.into_iter().map(|(word, _)| word).collect()
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_STOP_WORDS)
    }
}
