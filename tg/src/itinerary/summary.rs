//! Summary sections: trip totals and general notes

use serde::Serialize;

/// A run of summary content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum SummaryBlock {
    Paragraph(String),
    Bullets(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummarySection {
    pub title: String,
    pub content: Vec<SummaryBlock>,
}

impl SummarySection {
    pub fn parse(title: &str, content: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            content: parse_blocks(content),
        }
    }
}

/// Split content into bullet lists and paragraphs, in source order
///
/// Consecutive `- ` lines form one list. A blank line or a plain line
/// closes the open list; every plain line is its own paragraph.
pub fn parse_blocks(content: &str) -> Vec<SummaryBlock> {
    let mut blocks = Vec::new();
    let mut list: Option<Vec<String>> = None;

    for line in content.lines().map(str::trim) {
        if let Some(bullet) = line.strip_prefix("- ") {
            list.get_or_insert_with(Vec::new).push(bullet.to_string());
            continue;
        }
        if let Some(items) = list.take() {
            blocks.push(SummaryBlock::Bullets(items));
        }
        if !line.is_empty() {
            blocks.push(SummaryBlock::Paragraph(line.to_string()));
        }
    }
    if let Some(items) = list {
        blocks.push(SummaryBlock::Bullets(items));
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullets_grouped() {
        let blocks = parse_blocks("- Leg 1: 3h\n- Leg 2: 4h\n- Total: 7h");
        assert_eq!(
            blocks,
            vec![SummaryBlock::Bullets(vec![
                "Leg 1: 3h".to_string(),
                "Leg 2: 4h".to_string(),
                "Total: 7h".to_string()
            ])]
        );
    }

    #[test]
    fn test_alternating_runs_keep_order() {
        let blocks = parse_blocks("Intro line\n- a\n- b\nMiddle\n- c\n\n- d");
        assert_eq!(
            blocks,
            vec![
                SummaryBlock::Paragraph("Intro line".to_string()),
                SummaryBlock::Bullets(vec!["a".to_string(), "b".to_string()]),
                SummaryBlock::Paragraph("Middle".to_string()),
                SummaryBlock::Bullets(vec!["c".to_string()]),
                SummaryBlock::Bullets(vec!["d".to_string()]),
            ]
        );
    }

    #[test]
    fn test_empty_content() {
        assert!(parse_blocks("").is_empty());
        assert_eq!(SummarySection::parse(" Notes ", "").title, "Notes");
    }
}
