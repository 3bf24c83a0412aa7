//! modal-focus probe
//!
//! Inspects dialog elements for the attributes and affordances keyboard
//! and screen-reader users depend on: aria-modal, focusable children,
//! and a close control.

use chromiumoxide::Page;
use url::Url;

use super::{build_finding, node_from_snippet};
use crate::browser::eval_json;
use crate::error::Result;
use crate::report::{ProbeFindings, Severity, ViolationNode};

const HELP_URL: &str = "https://www.w3.org/WAI/WCAG21/Understanding/focus-order.html";

const DIALOG_JS: &str = r#"
(() => {
    const closeWords = ['close', 'dismiss', 'cancel', 'zavřít', 'zrušit', '×', 'x'];
    const dialogs = [];
    document.querySelectorAll('dialog, [role="dialog"], [role="alertdialog"]').forEach(dialog => {
        const problems = [];
        if (dialog.getAttribute('aria-modal') !== 'true') {
            problems.push('missing aria-modal="true"');
        }
        const focusables = dialog.querySelectorAll(
            'a[href], button, input, select, textarea, [tabindex]'
        );
        let focusableCount = 0;
        for (const el of focusables) {
            if (el.tabIndex >= 0 && !el.disabled) focusableCount++;
        }
        if (focusableCount === 0) {
            problems.push('contains no focusable elements');
        }
        let hasClose = false;
        dialog.querySelectorAll('button, a[href], [role="button"]').forEach(el => {
            const text = ((el.textContent || '') + ' ' + (el.getAttribute('aria-label') || ''))
                .trim().toLowerCase();
            if (closeWords.some(w => text === w || text.includes(w))) hasClose = true;
        });
        if (!hasClose) {
            problems.push('offers no close control');
        }
        if (problems.length) {
            dialogs.push({
                html: dialog.outerHTML.slice(0, 300),
                selector: dialog.id ? '#' + dialog.id
                    : dialog.tagName.toLowerCase() + '[role="dialog"]',
                problems
            });
        }
    });
    return JSON.stringify(dialogs);
})()
"#;

/// Run the modal-focus probe
pub async fn check(page: &Page, url: &Url) -> Result<Option<ProbeFindings>> {
    let raw = eval_json(page, DIALOG_JS).await?;
    let Some(dialogs) = raw.as_array() else {
        return Ok(None);
    };
    if dialogs.is_empty() {
        return Ok(None);
    }

    let nodes: Vec<ViolationNode> = dialogs
        .iter()
        .map(|dialog| {
            let problems: Vec<String> = dialog["problems"]
                .as_array()
                .map(|list| {
                    list.iter()
                        .filter_map(|p| p.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            node_from_snippet(
                dialog["html"].as_str().unwrap_or("<dialog>"),
                dialog["selector"].as_str().unwrap_or("dialog"),
                format!("Dialog {}.", problems.join(", ")),
            )
        })
        .collect();

    Ok(Some(build_finding(
        "modal-focus",
        "Dialogs must manage focus and be dismissable",
        "Dialogs need aria-modal, focusable content, and a labelled close control to work with the keyboard.",
        Severity::Serious,
        HELP_URL,
        nodes,
        url,
    )))
}
