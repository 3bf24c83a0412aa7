//! carousel-autoplay probe
//!
//! Snapshots carousel-like widgets, waits four seconds, and reports any
//! whose content changed without a pause or stop control being offered.

use std::time::Duration;

use chromiumoxide::Page;
use url::Url;

use super::{build_finding, node_from_snippet};
use crate::browser::eval_json;
use crate::error::Result;
use crate::report::{ProbeFindings, Severity, ViolationNode};

const HELP_URL: &str = "https://www.w3.org/WAI/WCAG21/Understanding/pause-stop-hide.html";
const OBSERVATION_SECS: u64 = 4;

/// Phase one: find visible carousel candidates without a pause control
/// and snapshot their markup on a window-scoped memo.
const SNAPSHOT_JS: &str = r#"
(() => {
    const pauseWords = ['pause', 'stop', 'zastavit', 'zastav'];
    const candidates = [];
    const seen = new Set();
    const selectors = [
        '[role="region"][aria-roledescription="carousel"]',
        '[class*="carousel"]', '[class*="slider"]',
        '[id*="carousel"]', '[id*="slider"]',
        '[data-carousel]', '[data-slider]'
    ];
    for (const sel of selectors) {
        for (const el of document.querySelectorAll(sel)) {
            if (seen.has(el)) continue;
            seen.add(el);
            const rect = el.getBoundingClientRect();
            if (rect.width === 0 || rect.height === 0) continue;
            let hasPause = false;
            el.querySelectorAll('button, [role="button"], a[href]').forEach(btn => {
                const text = ((btn.textContent || '') + ' '
                    + (btn.getAttribute('aria-label') || '')).toLowerCase();
                if (pauseWords.some(w => text.includes(w))) hasPause = true;
            });
            if (hasPause) continue;
            candidates.push(el);
        }
    }
    window.__psCarousels = candidates.map(el => ({ el, html: el.innerHTML }));
    return JSON.stringify({ count: candidates.length });
})()
"#;

/// Phase two: compare current markup against the snapshot.
const COMPARE_JS: &str = r#"
(() => {
    const changed = [];
    for (const entry of (window.__psCarousels || [])) {
        if (entry.el.innerHTML !== entry.html) {
            const el = entry.el;
            let selector = el.tagName.toLowerCase();
            if (el.id) selector = '#' + el.id;
            else if (el.className && typeof el.className === 'string') {
                const cls = el.className.split(/\s+/).filter(Boolean)[0];
                if (cls) selector += '.' + cls;
            }
            changed.push({ selector, html: el.outerHTML.slice(0, 300) });
        }
    }
    delete window.__psCarousels;
    return JSON.stringify(changed);
})()
"#;

/// Run the carousel-autoplay probe
pub async fn check(page: &Page, url: &Url) -> Result<Option<ProbeFindings>> {
    let snapshot = eval_json(page, SNAPSHOT_JS).await?;
    if snapshot["count"].as_u64().unwrap_or(0) == 0 {
        return Ok(None);
    }

    tokio::time::sleep(Duration::from_secs(OBSERVATION_SECS)).await;

    let changed = eval_json(page, COMPARE_JS).await?;
    let Some(entries) = changed.as_array() else {
        return Ok(None);
    };
    if entries.is_empty() {
        return Ok(None);
    }

    let nodes: Vec<ViolationNode> = entries
        .iter()
        .map(|entry| {
            node_from_snippet(
                entry["html"].as_str().unwrap_or("<div class=\"carousel\">"),
                entry["selector"].as_str().unwrap_or("div"),
                format!(
                    "Content changed within {} seconds and no pause or stop control is offered.",
                    OBSERVATION_SECS
                ),
            )
        })
        .collect();

    Ok(Some(build_finding(
        "carousel-autoplay",
        "Auto-advancing carousels must offer a pause control",
        "Moving content that cannot be paused distracts and excludes users who read slowly.",
        Severity::Serious,
        HELP_URL,
        nodes,
        url,
    )))
}
