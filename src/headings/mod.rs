//! Heading-structure extractor
//!
//! Walks h1-h6 in document order and flags outline problems: missing or
//! repeated h1, skipped levels, empty, duplicate, generic, and badly sized
//! heading texts.

use std::collections::HashMap;

use chromiumoxide::Page;
use tracing::{debug, info};

use crate::browser::eval_json;
use crate::error::Result;
use crate::report::{Heading, HeadingIssue, HeadingIssueKind, HeadingStructure};

/// Closed token set for headings that carry no information
const GENERIC_HEADINGS: &[&str] = &[
    "click here",
    "here",
    "more",
    "read more",
    "learn more",
    "info",
    "untitled",
    "zde",
    "více",
    "více zde",
    "klikněte zde",
];

const MAX_HEADING_LEN: usize = 100;

const EXTRACT_JS: &str = r#"
(() => {
    const headings = [];
    document.querySelectorAll('h1, h2, h3, h4, h5, h6').forEach(h => {
        const level = parseInt(h.tagName.charAt(1), 10);
        let selector = null;
        if (h.id) {
            selector = '#' + h.id;
        } else {
            selector = h.tagName.toLowerCase();
            const cls = (h.className || '').split(/\s+/).filter(Boolean)[0];
            if (cls) selector += '.' + cls;
        }
        headings.push({ level, text: h.textContent.trim(), selector });
    });
    return JSON.stringify(headings);
})()
"#;

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}…", s.chars().take(max).collect::<String>())
    } else {
        s.to_string()
    }
}

/// Detect outline issues over headings collected in document order
pub fn detect_issues(headings: &[Heading]) -> Vec<HeadingIssue> {
    let mut issues = Vec::new();

    let h1s: Vec<&Heading> = headings.iter().filter(|h| h.level == 1).collect();
    if h1s.is_empty() {
        issues.push(HeadingIssue {
            kind: HeadingIssueKind::MissingH1,
            message: "The page has no h1 heading.".to_string(),
            affected: Vec::new(),
        });
    }
    if h1s.len() > 1 {
        issues.push(HeadingIssue {
            kind: HeadingIssueKind::MultipleH1,
            message: format!("The page has {} h1 headings; expected exactly one.", h1s.len()),
            affected: h1s.iter().map(|h| h.text.clone()).collect(),
        });
    }

    // First skipped level breaks the scan
    let mut prev_level = 0u8;
    for heading in headings {
        if prev_level > 0 && heading.level > prev_level + 1 {
            issues.push(HeadingIssue {
                kind: HeadingIssueKind::SkippedLevel,
                message: format!(
                    "Heading level jumps from h{} to h{} at \"{}\".",
                    prev_level,
                    heading.level,
                    truncate(&heading.text, 40)
                ),
                affected: vec![heading.text.clone()],
            });
            break;
        }
        prev_level = heading.level;
    }

    for heading in headings {
        if heading.text.is_empty() {
            issues.push(HeadingIssue {
                kind: HeadingIssueKind::EmptyHeading,
                message: format!("Empty h{} heading.", heading.level),
                affected: Vec::new(),
            });
        }
    }

    if let Some(first) = headings.first() {
        if first.level != 1 {
            issues.push(HeadingIssue {
                kind: HeadingIssueKind::FirstNotH1,
                message: format!(
                    "The first heading is an h{}, not an h1 (\"{}\").",
                    first.level,
                    truncate(&first.text, 40)
                ),
                affected: vec![first.text.clone()],
            });
        }
    }

    let mut groups: HashMap<String, Vec<&Heading>> = HashMap::new();
    for heading in headings {
        if heading.text.is_empty() {
            continue;
        }
        groups
            .entry(format!("{}:{}", heading.level, heading.text.to_lowercase()))
            .or_default()
            .push(heading);
    }
    let mut duplicate_keys: Vec<_> = groups
        .iter()
        .filter(|(_, group)| group.len() > 1)
        .collect();
    duplicate_keys.sort_by(|a, b| a.0.cmp(b.0));
    for (_, group) in duplicate_keys {
        issues.push(HeadingIssue {
            kind: HeadingIssueKind::DuplicateHeadings,
            message: format!(
                "{} identical h{} headings: \"{}\".",
                group.len(),
                group[0].level,
                truncate(&group[0].text, 40)
            ),
            affected: group.iter().map(|h| h.text.clone()).collect(),
        });
    }

    for heading in headings {
        let lowered = heading.text.to_lowercase();
        if GENERIC_HEADINGS.contains(&lowered.as_str()) {
            issues.push(HeadingIssue {
                kind: HeadingIssueKind::GenericHeading,
                message: format!(
                    "Generic heading text \"{}\" says nothing about the section.",
                    heading.text
                ),
                affected: vec![heading.text.clone()],
            });
        }
    }

    for heading in headings {
        let chars = heading.text.chars().count();
        if chars > MAX_HEADING_LEN {
            issues.push(HeadingIssue {
                kind: HeadingIssueKind::VeryLong,
                message: format!(
                    "h{} heading is {} characters long: \"{}\".",
                    heading.level,
                    chars,
                    truncate(&heading.text, 40)
                ),
                affected: vec![heading.text.clone()],
            });
        } else if chars > 0 && chars <= 2 {
            issues.push(HeadingIssue {
                kind: HeadingIssueKind::VeryShort,
                message: format!("h{} heading \"{}\" is too short.", heading.level, heading.text),
                affected: vec![heading.text.clone()],
            });
        }
    }

    issues
}

/// Extract the heading outline and detect issues
pub async fn extract(page: &Page) -> Result<HeadingStructure> {
    debug!("Extracting heading structure...");
    let raw = eval_json(page, EXTRACT_JS).await?;
    let headings: Vec<Heading> = serde_json::from_value(raw).unwrap_or_default();
    let issues = detect_issues(&headings);
    info!(
        "Heading structure: {} headings, {} issues",
        headings.len(),
        issues.len()
    );
    Ok(HeadingStructure { headings, issues })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(level: u8, text: &str) -> Heading {
        Heading {
            level,
            text: text.to_string(),
            selector: None,
        }
    }

    fn kinds(issues: &[HeadingIssue]) -> Vec<HeadingIssueKind> {
        issues.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn test_three_h2_no_h1() {
        let headings = vec![heading(2, "One"), heading(2, "Two"), heading(2, "Three")];
        let issues = detect_issues(&headings);
        let kinds = kinds(&issues);
        assert!(kinds.contains(&HeadingIssueKind::MissingH1));
        assert!(!kinds.contains(&HeadingIssueKind::SkippedLevel));
        assert!(kinds.contains(&HeadingIssueKind::FirstNotH1));
    }

    #[test]
    fn test_multiple_h1_carries_affected() {
        let headings = vec![heading(1, "Home"), heading(1, "Welcome")];
        let issues = detect_issues(&headings);
        let issue = issues
            .iter()
            .find(|i| i.kind == HeadingIssueKind::MultipleH1)
            .unwrap();
        assert_eq!(issue.affected, vec!["Home", "Welcome"]);
    }

    #[test]
    fn test_skipped_level_reported_once() {
        let headings = vec![
            heading(1, "Title"),
            heading(3, "Jump one"),
            heading(5, "Jump two"),
        ];
        let issues = detect_issues(&headings);
        let skips = issues
            .iter()
            .filter(|i| i.kind == HeadingIssueKind::SkippedLevel)
            .count();
        assert_eq!(skips, 1);
    }

    #[test]
    fn test_empty_and_short_headings() {
        let headings = vec![heading(1, "Title"), heading(2, ""), heading(2, "Ok")];
        let issues = detect_issues(&headings);
        let kinds = kinds(&issues);
        assert!(kinds.contains(&HeadingIssueKind::EmptyHeading));
        assert!(kinds.contains(&HeadingIssueKind::VeryShort));
    }

    #[test]
    fn test_duplicates_keyed_by_level_and_lower_text() {
        let headings = vec![
            heading(1, "Title"),
            heading(2, "Pricing"),
            heading(2, "PRICING"),
            heading(3, "Pricing"),
        ];
        let issues = detect_issues(&headings);
        let dupes: Vec<_> = issues
            .iter()
            .filter(|i| i.kind == HeadingIssueKind::DuplicateHeadings)
            .collect();
        // Same text at a different level is not a duplicate
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].affected.len(), 2);
    }

    #[test]
    fn test_generic_heading_tokens() {
        let headings = vec![heading(1, "Title"), heading(2, "Click here"), heading(2, "Zde")];
        let issues = detect_issues(&headings);
        let generic = issues
            .iter()
            .filter(|i| i.kind == HeadingIssueKind::GenericHeading)
            .count();
        assert_eq!(generic, 2);
    }

    #[test]
    fn test_very_long_heading() {
        let headings = vec![heading(1, &"x".repeat(120))];
        let issues = detect_issues(&headings);
        assert!(kinds(&issues).contains(&HeadingIssueKind::VeryLong));
    }

    #[test]
    fn test_clean_outline_has_no_issues() {
        let headings = vec![
            heading(1, "Product catalogue"),
            heading(2, "Shoes"),
            heading(3, "Running shoes"),
            heading(2, "Accessories"),
        ];
        assert!(detect_issues(&headings).is_empty());
    }
}
