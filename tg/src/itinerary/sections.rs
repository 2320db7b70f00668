//! First pass: split raw itinerary text into day and summary sections

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

pub const DAY_MARKER: &str = "DAY_SECTIONS:";
pub const SUMMARY_MARKER: &str = "SUMMARY_SECTIONS:";

static DAY_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Day (\d+)$").expect("day title pattern is valid"));

static DAY_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)DAY_SECTIONS:\s*\n(.*?)SUMMARY_SECTIONS:").expect("day block pattern is valid"));

static SUMMARY_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)SUMMARY_SECTIONS:\s*\n(.*)").expect("summary block pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Day,
    Summary,
}

/// A titled block of itinerary text before field extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    pub kind: SectionKind,
    pub title: String,
    pub content: String,
    pub day_number: Option<u32>,
}

impl RawSection {
    /// A `Day N` block, if the title says so
    fn day(title: &str, content: String) -> Option<Self> {
        let number = DAY_TITLE_RE.captures(title)?.get(1)?.as_str().parse().ok()?;
        Some(Self {
            kind: SectionKind::Day,
            title: title.to_string(),
            content,
            day_number: Some(number),
        })
    }

    fn summary(title: &str, content: String) -> Self {
        Self {
            kind: SectionKind::Summary,
            title: title.to_string(),
            content,
            day_number: None,
        }
    }
}

/// Split into ordered sections
///
/// With both delimiters present, day blocks come from between them and
/// summary blocks from after the summary delimiter. Otherwise blocks are
/// classified by their first line and unrecognised blocks are dropped.
pub fn split_sections(text: &str) -> Vec<RawSection> {
    if text.contains(DAY_MARKER) && text.contains(SUMMARY_MARKER) {
        debug!("split_sections: delimited format");
        return split_delimited(text);
    }
    debug!("split_sections: blank-line blocks");
    blocks(text)
        .into_iter()
        .filter_map(|(title, content)| {
            RawSection::day(&title, content.clone()).or_else(|| {
                is_summary_title(&title).then(|| RawSection::summary(&title, content))
            })
        })
        .collect()
}

fn split_delimited(text: &str) -> Vec<RawSection> {
    let mut sections = Vec::new();

    if let Some(days) = DAY_BLOCK_RE.captures(text).and_then(|c| c.get(1)) {
        sections.extend(
            blocks(days.as_str())
                .into_iter()
                .filter_map(|(title, content)| RawSection::day(&title, content)),
        );
    }
    if let Some(summary) = SUMMARY_BLOCK_RE.captures(text).and_then(|c| c.get(1)) {
        sections.extend(
            blocks(summary.as_str())
                .into_iter()
                .filter(|(title, _)| !title.starts_with('-'))
                .map(|(title, content)| RawSection::summary(&title, content)),
        );
    }
    sections
}

/// Summary titles recognised without delimiters
fn is_summary_title(title: &str) -> bool {
    title.contains("Estimated total") || title == "Notes" || title.contains("total trip")
}

/// Blank-line separated blocks as (trimmed first line, trimmed rest)
fn blocks(text: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    let mut flush = |lines: &mut Vec<&str>| {
        if let Some((first, rest)) = lines.split_first() {
            out.push((first.trim().to_string(), rest.join("\n").trim().to_string()));
        }
        lines.clear();
    };

    for line in text.lines() {
        if line.trim().is_empty() {
            flush(&mut current);
        } else {
            current.push(line);
        }
    }
    flush(&mut current);
    out
}
