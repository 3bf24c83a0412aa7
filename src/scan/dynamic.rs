//! Dynamic state exploration
//!
//! Clicks a bounded set of expanders (menu toggles, modal openers, the
//! language switcher) with short delays so collapsed UI gets rendered
//! before the rules engine runs. Best effort by design.

use std::time::Duration;

use chromiumoxide::Page;
use tracing::debug;

use crate::browser::eval_json;
use crate::error::Result;

/// At most this many expanders are activated per page
const MAX_EXPANDERS: usize = 5;
const CLICK_DELAY_MS: u64 = 250;

const COLLECT_EXPANDERS_JS: &str = r#"
(() => {
    const selectors = [
        '[aria-expanded="false"]',
        '[aria-haspopup="true"]',
        '.menu-toggle', '.hamburger', '.navbar-toggler',
        '.dropdown-toggle', '.language-switcher button', '.lang-switcher button'
    ];
    const seen = new Set();
    const out = [];
    let counter = 0;
    for (const sel of selectors) {
        for (const el of document.querySelectorAll(sel)) {
            if (seen.has(el)) continue;
            seen.add(el);
            const rect = el.getBoundingClientRect();
            if (rect.width === 0 || rect.height === 0) continue;
            const mark = 'ps-expander-' + (counter++);
            el.setAttribute('data-ps-expander', mark);
            out.push(mark);
        }
    }
    return JSON.stringify(out);
})()
"#;

/// Hover nav/menu candidates so megamenus render their links
const HOVER_MENUS_JS: &str = r#"
(() => {
    let hovered = 0;
    const candidates = document.querySelectorAll(
        'nav li, .menu > li, [role="menubar"] > *, .megamenu > li'
    );
    for (const el of candidates) {
        if (hovered >= 10) break;
        el.dispatchEvent(new MouseEvent('mouseover', { bubbles: true }));
        el.dispatchEvent(new MouseEvent('mouseenter', { bubbles: false }));
        hovered++;
    }
    return JSON.stringify({ hovered });
})()
"#;

/// Click expander candidates one by one, pausing between clicks, then
/// hover the navigation so dropdown links end up in the DOM.
pub async fn explore(page: &Page) -> Result<usize> {
    let raw = eval_json(page, COLLECT_EXPANDERS_JS).await?;
    let marks: Vec<String> = serde_json::from_value(raw).unwrap_or_default();

    let mut clicked = 0;
    for mark in marks.iter().take(MAX_EXPANDERS) {
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector('[data-ps-expander="{mark}"]');
                if (!el) return JSON.stringify({{ clicked: false }});
                el.click();
                return JSON.stringify({{ clicked: true }});
            }})()
            "#
        );
        let outcome = eval_json(page, &js).await?;
        if outcome["clicked"].as_bool().unwrap_or(false) {
            clicked += 1;
        }
        tokio::time::sleep(Duration::from_millis(CLICK_DELAY_MS)).await;
    }

    let hovered = eval_json(page, HOVER_MENUS_JS).await?;
    tokio::time::sleep(Duration::from_millis(CLICK_DELAY_MS)).await;

    debug!(
        "Dynamic exploration clicked {} expanders, hovered {} menu items",
        clicked,
        hovered["hovered"].as_u64().unwrap_or(0)
    );
    Ok(clicked)
}
