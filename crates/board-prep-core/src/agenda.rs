//! Agenda item reconstruction.
//!
//! The conversion step splits a meeting packet into one markdown file per
//! segment but never states which segments are agenda items. An
//! [`AgendaItem`] is recovered from the segment title, the filename, and
//! the first substantial paragraph of the content.
//!
//! Documents without a recognisable item number (full agendas, minutes,
//! the overview page) yield [`SkipReason::NoItemNumber`]. That is the
//! expected outcome for them, not an indexing failure.

use std::sync::LazyLock;

use regex::Regex;

use crate::keywords::KeywordExtractor;
use crate::models::{AgendaItem, DocumentRecord, Section, SkipReason};

static TITLE_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+[A-Z]?)").expect("static regex"));
static FILENAME_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--(\d+)-([A-Z])-").expect("static regex"));
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#+\s*").expect("static regex"));
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("static regex"));
static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("static regex"));

/// Paragraphs containing any of these are conversion boilerplate.
const BOILERPLATE_MARKERS: [&str; 4] = [
    "document information",
    "meeting document context",
    "source:",
    "pages:",
];

/// Minimum length (exclusive) for a paragraph to count as a description.
const MIN_DESCRIPTION_CHARS: usize = 50;
const MAX_DESCRIPTION_CHARS: usize = 200;

/// Find the agenda item number, e.g. `"5B"`.
///
/// The first `digits[A-Z]` run in the segment title wins. Otherwise the
/// filename is searched for `--<digits>-<letter>-`.
pub fn extract_item_number(segment_title: &str, filename: &str) -> Option<String> {
    if let Some(m) = TITLE_ITEM_RE.find(segment_title) {
        return Some(m.as_str().to_string());
    }
    FILENAME_ITEM_RE
        .captures(filename)
        .map(|caps| format!("{}{}", &caps[1], &caps[2]))
}

/// Classify a title into a [`Section`]. Order matters; first match wins.
pub fn classify_section(title: &str) -> Section {
    let lower = title.to_lowercase();
    if lower.contains("administrator") {
        Section::Administrative
    } else if lower.contains("public hearing") {
        Section::PublicHearings
    } else if ["consider", "approval", "receipt"]
        .iter()
        .any(|w| lower.contains(w))
    {
        Section::NewBusiness
    } else {
        Section::Unknown
    }
}

/// First substantial, non-boilerplate paragraph, capped at 200 characters.
pub fn extract_description(content: &str) -> Option<String> {
    let clean = HEADER_RE.replace_all(content, "");
    let clean = BOLD_RE.replace_all(&clean, "$1");
    let clean = CODE_RE.replace_all(&clean, "$1");

    clean
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter(|p| {
            let lower = p.to_lowercase();
            !BOILERPLATE_MARKERS.iter().any(|m| lower.contains(m))
        })
        .find(|p| p.chars().count() > MIN_DESCRIPTION_CHARS)
        .map(|p| {
            if p.chars().count() > MAX_DESCRIPTION_CHARS {
                let head: String = p.chars().take(MAX_DESCRIPTION_CHARS).collect();
                format!("{}...", head)
            } else {
                p.to_string()
            }
        })
}

/// Pick the PDF segment whose filename contains the item number.
///
/// Matching is a case-insensitive substring test, so `"5"` also matches
/// `"15B"`. Candidates are sorted first so the pick does not depend on
/// directory iteration order.
pub fn find_pdf_segment(item_number: &str, candidates: &[String]) -> Option<String> {
    let needle = item_number.to_lowercase();
    let mut sorted: Vec<&String> = candidates.iter().collect();
    sorted.sort();
    sorted
        .into_iter()
        .find(|name| name.to_lowercase().contains(&needle))
        .cloned()
}

/// Reconstruct an [`AgendaItem`] from a manifest record and its content.
///
/// `pdf_segment` is the already-resolved segment path, if any (see
/// [`find_pdf_segment`]).
pub fn build_agenda_item(
    record: &DocumentRecord,
    content: &str,
    pdf_segment: Option<String>,
    extractor: &KeywordExtractor,
    max_keywords: usize,
) -> Result<AgendaItem, SkipReason> {
    let item_number = extract_item_number(record.title(), &record.filename)
        .ok_or(SkipReason::NoItemNumber)?;
    let title = record.title().trim().to_string();
    let description = extract_description(content);

    // Titles like "5B - Permit Application" carry no section cue; the
    // lead paragraph usually does.
    let section = match classify_section(&title) {
        Section::Unknown => description
            .as_deref()
            .map(classify_section)
            .unwrap_or(Section::Unknown),
        known => known,
    };

    Ok(AgendaItem {
        id: item_number.clone(),
        section,
        item_number,
        title,
        description,
        markdown_file: record.filename.clone(),
        pdf_segment,
        page_range: record.page_range.clone(),
        page_count: record.page_count,
        attachments: Vec::new(),
        metadata: record.clone(),
        keywords: extractor.extract(content, max_keywords),
        action_required: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(filename: &str, title: &str) -> DocumentRecord {
        let mut r = DocumentRecord::new(filename);
        r.segment_title = Some(title.to_string());
        r
    }

    #[test]
    fn test_item_number_from_title() {
        assert_eq!(
            extract_item_number("5B - Permit Application", "x.md"),
            Some("5B".to_string())
        );
        assert_eq!(
            extract_item_number("Item 12 Budget", "x.md"),
            Some("12".to_string())
        );
    }

    #[test]
    fn test_item_number_lowercase_letter_not_included() {
        assert_eq!(
            extract_item_number("7a - Road Paving", "x.md"),
            Some("7".to_string())
        );
    }

    #[test]
    fn test_item_number_from_filename() {
        assert_eq!(
            extract_item_number("Permit Application", "Packet--5-B-permit.md"),
            Some("5B".to_string())
        );
    }

    #[test]
    fn test_item_number_absent() {
        assert_eq!(extract_item_number("Full Agenda", "agenda.md"), None);
        assert_eq!(extract_item_number("", ""), None);
    }

    #[test]
    fn test_classify_section() {
        assert_eq!(
            classify_section("Town Administrator Report"),
            Section::Administrative
        );
        assert_eq!(
            classify_section("PUBLIC HEARING - Zoning"),
            Section::PublicHearings
        );
        assert_eq!(classify_section("Consider budget"), Section::NewBusiness);
        assert_eq!(classify_section("Receipt of petition"), Section::NewBusiness);
        assert_eq!(classify_section("Roll call"), Section::Unknown);
    }

    #[test]
    fn test_classify_section_priority() {
        assert_eq!(
            classify_section("Public hearing to consider approval"),
            Section::PublicHearings
        );
        assert_eq!(
            classify_section("Administrator: consider public hearing"),
            Section::Administrative
        );
    }

    #[test]
    fn test_description_skips_boilerplate_and_short() {
        let content = "# 5B - Permit\n\n\
            ## Document Information\n\n\
            **Source:** packet.pdf, a long enough line to pass the length check easily\n\n\
            Short line.\n\n\
            The applicant seeks approval for a special permit to operate a farm stand.";
        let desc = extract_description(content).unwrap();
        assert!(desc.starts_with("The applicant seeks approval for"));
    }

    #[test]
    fn test_description_strips_markdown() {
        let content = "The **applicant** seeks `approval` for a special permit on Main Street today.";
        let desc = extract_description(content).unwrap();
        assert_eq!(
            desc,
            "The applicant seeks approval for a special permit on Main Street today."
        );
    }

    #[test]
    fn test_description_truncated() {
        let content = "word ".repeat(100);
        let desc = extract_description(&content).unwrap();
        assert_eq!(desc.chars().count(), 203);
        assert!(desc.ends_with("..."));
    }

    #[test]
    fn test_description_none() {
        assert_eq!(extract_description("# Title\n\nShort."), None);
    }

    #[test]
    fn test_find_pdf_segment_sorted() {
        let candidates = vec![
            "packet-5B-zoning.pdf".to_string(),
            "packet-5b-permit.pdf".to_string(),
            "packet-3A.pdf".to_string(),
        ];
        assert_eq!(
            find_pdf_segment("5B", &candidates),
            Some("packet-5B-zoning.pdf".to_string())
        );
        assert_eq!(find_pdf_segment("9C", &candidates), None);
    }

    #[test]
    fn test_build_agenda_item() {
        let mut r = record("5b-permit-application.md", "5B - Permit Application");
        r.page_range = Some("22-27".to_string());
        r.page_count = Some(6);
        let content = "# 5B\n\nThe applicant seeks approval for a new permit to expand the parking area.";
        let item = build_agenda_item(&r, content, None, &KeywordExtractor::default(), 10).unwrap();
        assert_eq!(item.id, "5B");
        assert_eq!(item.item_number, "5B");
        assert_eq!(item.section, Section::NewBusiness);
        assert_eq!(item.title, "5B - Permit Application");
        assert_eq!(item.markdown_file, "5b-permit-application.md");
        assert_eq!(item.page_range.as_deref(), Some("22-27"));
        assert_eq!(item.page_count, Some(6));
        assert!(item
            .description
            .as_deref()
            .unwrap()
            .starts_with("The applicant seeks approval for"));
        assert!(item.keywords.len() <= 10);
        assert!(item.keywords.contains(&"applicant".to_string()));
    }

    #[test]
    fn test_title_section_wins_over_description() {
        let r = record("x.md", "3A - Public Hearing on Zoning");
        let content = "Residents may comment before the board votes on approval of the map.";
        let item = build_agenda_item(&r, content, None, &KeywordExtractor::default(), 10).unwrap();
        assert_eq!(item.section, Section::PublicHearings);

        let r = record("y.md", "4C - Road Paving");
        let content = "Paving of the northern segment is scheduled for the summer season.";
        let item = build_agenda_item(&r, content, None, &KeywordExtractor::default(), 10).unwrap();
        assert_eq!(item.section, Section::Unknown);
    }

    #[test]
    fn test_build_agenda_item_skips_without_number() {
        let r = record("minutes.md", "Regular Meeting Minutes");
        let result = build_agenda_item(&r, "content", None, &KeywordExtractor::default(), 10);
        assert_eq!(result, Err(SkipReason::NoItemNumber));
    }
}
