//! skip-link probe
//!
//! Looks for a keyboard-focusable skip-to-content link among the first
//! focusable elements and verifies its target exists and is (or contains)
//! the main content region.

use chromiumoxide::Page;
use url::Url;

use super::{build_finding, node_from_snippet};
use crate::browser::eval_json;
use crate::error::Result;
use crate::report::{ProbeFindings, Severity};

const HELP_URL: &str = "https://www.w3.org/WAI/WCAG21/Understanding/bypass-blocks.html";

/// Known skip-link text patterns, English and Czech
const SKIP_PATTERNS: &[&str] = &[
    "skip to content",
    "skip to main",
    "skip navigation",
    "jump to content",
    "jump to main",
    "přeskočit na obsah",
    "přeskočit navigaci",
];

const SKIP_LINK_JS: &str = r#"
(() => {
    const patterns = %PATTERNS%;
    const focusables = Array.from(document.querySelectorAll(
        'a[href], button, [tabindex]'
    )).filter(el => el.tabIndex >= 0).slice(0, 10);

    for (const el of focusables) {
        const text = ((el.textContent || '') + ' ' + (el.getAttribute('aria-label') || ''))
            .trim().toLowerCase();
        const matches = patterns.some(p => text.includes(p));
        const href = el.getAttribute('href') || '';
        const looksLikeSkip = matches || href === '#main' || href === '#content'
            || href === '#main-content';
        if (!looksLikeSkip) continue;

        if (!href.startsWith('#') || href.length < 2) {
            return JSON.stringify({
                found: true, valid: false,
                html: el.outerHTML.slice(0, 300),
                reason: 'Skip link has no fragment target.'
            });
        }
        const target = document.getElementById(href.slice(1));
        if (!target) {
            return JSON.stringify({
                found: true, valid: false,
                html: el.outerHTML.slice(0, 300),
                reason: 'Skip link target "' + href + '" does not exist.'
            });
        }
        const isMain = target.tagName === 'MAIN'
            || target.getAttribute('role') === 'main'
            || target.querySelector('main, [role="main"]') !== null
            || ['content', 'main', 'main-content'].includes(target.id);
        if (!isMain) {
            return JSON.stringify({
                found: true, valid: false,
                html: el.outerHTML.slice(0, 300),
                reason: 'Skip link target "' + href + '" is not the main content region.'
            });
        }
        return JSON.stringify({ found: true, valid: true });
    }
    return JSON.stringify({ found: false });
})()
"#;

/// Run the skip-link probe
pub async fn check(page: &Page, url: &Url) -> Result<Option<ProbeFindings>> {
    let js = SKIP_LINK_JS.replace("%PATTERNS%", &serde_json::to_string(SKIP_PATTERNS)?);
    let raw = eval_json(page, &js).await?;

    let found = raw["found"].as_bool().unwrap_or(false);
    let valid = raw["valid"].as_bool().unwrap_or(false);
    if found && valid {
        return Ok(None);
    }

    let (html, target, summary) = if found {
        (
            raw["html"].as_str().unwrap_or("<a>").to_string(),
            "a".to_string(),
            raw["reason"]
                .as_str()
                .unwrap_or("The skip link does not lead to the main content.")
                .to_string(),
        )
    } else {
        (
            "<body>".to_string(),
            "body".to_string(),
            "No keyboard-focusable skip-to-content link was found.".to_string(),
        )
    };

    Ok(Some(build_finding(
        "skip-link",
        "A skip link must lead keyboard users to the main content",
        "Without a working skip link, keyboard users must tab through repeated blocks on every page.",
        Severity::Serious,
        HELP_URL,
        vec![node_from_snippet(html, target, summary)],
        url,
    )))
}
