//! suspicious-alt probe
//!
//! Non-empty alt texts that look like filenames, generic placeholders,
//! redundant phrases, or are too short to describe anything. One violation
//! is emitted per image, carrying the matched sub-type.

use chromiumoxide::Page;
use serde::{Deserialize, Serialize};
use url::Url;

use super::node_from_snippet;
use crate::browser::eval_json;
use crate::error::Result;
use crate::report::{
    action_item_for, guidance_for, ActRuleRef, ProbeFindings, Severity, Violation,
};

const HELP_URL: &str = "https://www.w3.org/WAI/WCAG21/Understanding/non-text-content.html";

/// Why an alt text is suspicious
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AltIssueKind {
    Filename,
    Placeholder,
    TooShort,
    Redundant,
}

impl AltIssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AltIssueKind::Filename => "filename",
            AltIssueKind::Placeholder => "placeholder",
            AltIssueKind::TooShort => "too-short",
            AltIssueKind::Redundant => "redundant",
        }
    }
}

const FILE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".bmp", ".tif", ".tiff",
];

const PLACEHOLDERS: &[&str] = &[
    "image", "img", "photo", "picture", "graphic", "icon", "banner", "untitled", "obrázek",
    "foto", "obrazek",
];

const REDUNDANT_PREFIXES: &[&str] = &[
    "image of", "picture of", "photo of", "graphic of", "icon of", "obrázek",
];

/// Classify one non-empty alt text; `None` means it looks fine
pub fn classify_alt(alt: &str) -> Option<AltIssueKind> {
    let trimmed = alt.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_lowercase();

    if FILE_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext)) {
        return Some(AltIssueKind::Filename);
    }
    // DSC_1234 / IMG-0042 style camera names
    let compact: String = lowered.chars().filter(|c| !c.is_whitespace()).collect();
    for prefix in ["img", "dsc", "image", "photo", "pic"] {
        if let Some(rest) = compact.strip_prefix(prefix) {
            let rest = rest.trim_start_matches(['-', '_']);
            if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
                return Some(AltIssueKind::Filename);
            }
        }
    }

    if PLACEHOLDERS.contains(&lowered.as_str()) {
        return Some(AltIssueKind::Placeholder);
    }

    for prefix in REDUNDANT_PREFIXES {
        if lowered.starts_with(prefix) && lowered.len() > prefix.len() {
            return Some(AltIssueKind::Redundant);
        }
    }

    let char_count = trimmed.chars().count();
    if char_count <= 2 {
        // Short all-caps strings are acronyms, not noise
        let is_acronym = trimmed.chars().all(|c| c.is_uppercase() || c.is_ascii_digit());
        if !is_acronym {
            return Some(AltIssueKind::TooShort);
        }
    }

    None
}

const COLLECT_ALTS_JS: &str = r#"
(() => {
    const images = [];
    document.querySelectorAll('img[alt]').forEach((img, index) => {
        const alt = img.getAttribute('alt') || '';
        if (!alt.trim()) return;
        let selector = 'img';
        if (img.id) selector = '#' + img.id;
        else selector = 'img:nth-of-type(' + (index + 1) + ')';
        images.push({ alt, selector, html: img.outerHTML.slice(0, 300) });
    });
    return JSON.stringify(images);
})()
"#;

/// Run the suspicious-alt probe
pub async fn check(page: &Page, url: &Url) -> Result<Option<ProbeFindings>> {
    let raw = eval_json(page, COLLECT_ALTS_JS).await?;
    let Some(images) = raw.as_array() else {
        return Ok(None);
    };

    let guidance = guidance_for("suspicious-alt");
    let mut violations = Vec::new();
    for image in images {
        let alt = image["alt"].as_str().unwrap_or("");
        let Some(kind) = classify_alt(alt) else {
            continue;
        };
        let node = node_from_snippet(
            image["html"].as_str().unwrap_or("<img>"),
            image["selector"].as_str().unwrap_or("img"),
            format!("Alt text \"{}\" looks like a {}.", alt, kind.as_str()),
        );
        violations.push(
            Violation::new(
                "suspicious-alt",
                "Alt text must describe the image",
                format!(
                    "The alt text matches the \"{}\" pattern and conveys nothing useful.",
                    kind.as_str()
                ),
                Severity::Moderate,
                HELP_URL,
                vec![node],
            )
            .with_fix(guidance.fix)
            .with_act_rules(guidance.act.iter().map(|id| ActRuleRef::new(id)).collect()),
        );
    }

    if violations.is_empty() {
        return Ok(None);
    }

    // One action item for the rule, scaled by the total occurrence count
    let mut aggregate = violations[0].clone();
    aggregate.count = violations.iter().map(|v| v.count).sum();
    let item = action_item_for(&aggregate, url, &[]);

    Ok(Some(ProbeFindings {
        violations,
        action_items: vec![item],
    }))
}
