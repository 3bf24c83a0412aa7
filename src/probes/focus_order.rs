//! focus-order probe
//!
//! Tab-walks the page (up to 200 presses) and reports focus traps, visual
//! focus jumps upward of 100 px, and focus escaping an open modal. A
//! revisit is only safe when focus wrapped through the browser chrome
//! first, or the cycle length matches that recorded page wrap.

use std::collections::HashMap;
use std::time::Duration;

use chromiumoxide::Page;
use tracing::debug;
use url::Url;

use super::{build_finding, node_from_snippet};
use crate::browser::{eval_json, press_tab};
use crate::error::Result;
use crate::report::{ProbeFindings, Severity, ViolationNode};

const MAX_PRESSES: usize = 200;
const TRAP_WINDOW: usize = 10;
const JUMP_THRESHOLD_PX: f64 = 100.0;
const HELP_URL: &str = "https://www.w3.org/WAI/WCAG21/Understanding/focus-order.html";

/// Focus state after one Tab press
#[derive(Debug, Clone)]
pub(crate) struct FocusStep {
    pub selector: String,
    pub html: String,
    /// Absolute top of the focused element
    pub top: f64,
    /// An `aria-modal="true"` element is visible
    pub modal_open: bool,
    /// The focused element is contained in that modal
    pub inside_modal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum IssueKind {
    FocusTrap,
    VisualFocusJump,
    ModalFocusBleed,
}

#[derive(Debug)]
pub(crate) struct FocusIssue {
    kind: IssueKind,
    selector: String,
    html: String,
    summary: String,
}

/// Incremental trap/jump/bleed detection over the Tab sequence
#[derive(Debug, Default)]
pub(crate) struct FocusOrderDetector {
    issues: Vec<FocusIssue>,
    last_seen: HashMap<String, usize>,
    /// Press index at which focus last left the document (page wrap)
    last_wrap: Option<usize>,
    /// Cycle length of the recorded page wrap
    safe_cycle: Option<usize>,
    prev_top: Option<f64>,
}

impl FocusOrderDetector {
    /// Focus left the document on this press; the next revisit is a wrap
    pub fn observe_wrap(&mut self, index: usize) {
        self.last_wrap = Some(index);
        self.prev_top = None;
    }

    /// Feed one step; returns false once a trap confirms and the walk
    /// should stop.
    pub fn observe(&mut self, index: usize, step: &FocusStep) -> bool {
        if let Some(&previous) = self.last_seen.get(&step.selector) {
            let cycle = index - previous;
            let wrapped_between = self.last_wrap.map_or(false, |w| w > previous);
            if wrapped_between {
                self.safe_cycle = Some(cycle);
            } else if cycle < TRAP_WINDOW && self.safe_cycle != Some(cycle) {
                self.issues.push(FocusIssue {
                    kind: IssueKind::FocusTrap,
                    selector: step.selector.clone(),
                    html: step.html.clone(),
                    summary: format!(
                        "Tab focus cycles back to this element every {} presses.",
                        cycle
                    ),
                });
                return false;
            }
        }
        self.last_seen.insert(step.selector.clone(), index);

        if let Some(prev_top) = self.prev_top {
            if prev_top - step.top > JUMP_THRESHOLD_PX {
                self.issues.push(FocusIssue {
                    kind: IssueKind::VisualFocusJump,
                    selector: step.selector.clone(),
                    html: step.html.clone(),
                    summary: format!(
                        "Focus jumped {:.0} px upward against reading order.",
                        prev_top - step.top
                    ),
                });
            }
        }
        self.prev_top = Some(step.top);

        if step.modal_open && !step.inside_modal {
            self.issues.push(FocusIssue {
                kind: IssueKind::ModalFocusBleed,
                selector: step.selector.clone(),
                html: step.html.clone(),
                summary: "Focus left an open aria-modal dialog.".to_string(),
            });
        }

        true
    }

    /// De-duplicate by (issue kind, selector) and hand the issues out
    pub fn into_issues(self) -> Vec<FocusIssue> {
        let mut seen = std::collections::HashSet::new();
        self.issues
            .into_iter()
            .filter(|issue| seen.insert((issue.kind, issue.selector.clone())))
            .collect()
    }
}

const RESET_JS: &str = r#"
(() => {
    if (document.activeElement && document.activeElement !== document.body) {
        document.activeElement.blur();
    }
    window.scrollTo(0, 0);
    return JSON.stringify({ ok: true });
})()
"#;

const READ_JS: &str = r#"
(() => {
    let el = document.activeElement;
    while (el && el.shadowRoot && el.shadowRoot.activeElement) {
        el = el.shadowRoot.activeElement;
    }
    if (!el || el === document.body || el === document.documentElement) {
        return JSON.stringify({ active: false });
    }
    const pathFor = (node) => {
        const parts = [];
        while (node && node.nodeType === 1 && parts.length < 8) {
            if (node.id) { parts.unshift('#' + node.id); break; }
            let part = node.tagName.toLowerCase();
            const parent = node.parentElement;
            if (parent) {
                const same = Array.from(parent.children)
                    .filter(c => c.tagName === node.tagName);
                if (same.length > 1) {
                    part += ':nth-of-type(' + (same.indexOf(node) + 1) + ')';
                }
            }
            parts.unshift(part);
            node = parent;
        }
        return parts.join(' > ');
    };
    const rect = el.getBoundingClientRect();
    let modal = null;
    for (const candidate of document.querySelectorAll('[aria-modal="true"]')) {
        const style = window.getComputedStyle(candidate);
        if (style.display !== 'none' && style.visibility !== 'hidden') {
            modal = candidate;
            break;
        }
    }
    return JSON.stringify({
        active: true,
        selector: pathFor(el),
        html: el.outerHTML.slice(0, 300),
        top: rect.top + window.scrollY,
        modalOpen: modal !== null,
        insideModal: modal !== null && modal.contains(el)
    });
})()
"#;

/// Run the focus-order probe
pub async fn check(page: &Page, url: &Url) -> Result<Option<ProbeFindings>> {
    eval_json(page, RESET_JS).await?;

    let mut detector = FocusOrderDetector::default();
    let mut consecutive_inactive = 0;
    for index in 1..=MAX_PRESSES {
        press_tab(page).await?;
        tokio::time::sleep(Duration::from_millis(25)).await;

        let raw = eval_json(page, READ_JS).await?;
        if !raw["active"].as_bool().unwrap_or(false) {
            detector.observe_wrap(index);
            consecutive_inactive += 1;
            if consecutive_inactive >= 2 {
                break;
            }
            continue;
        }
        consecutive_inactive = 0;
        let step = FocusStep {
            selector: raw["selector"].as_str().unwrap_or("").to_string(),
            html: raw["html"].as_str().unwrap_or("").to_string(),
            top: raw["top"].as_f64().unwrap_or(0.0),
            modal_open: raw["modalOpen"].as_bool().unwrap_or(false),
            inside_modal: raw["insideModal"].as_bool().unwrap_or(false),
        };
        if !detector.observe(index, &step) {
            debug!("focus-order walk stopped at press {}", index);
            break;
        }
    }

    let issues = detector.into_issues();
    if issues.is_empty() {
        return Ok(None);
    }

    let has_bleed = issues.iter().any(|i| i.kind == IssueKind::ModalFocusBleed);
    let nodes: Vec<ViolationNode> = issues
        .into_iter()
        .map(|issue| {
            let kind = issue.kind;
            let mut node = node_from_snippet(issue.html, issue.selector, issue.summary);
            if kind == IssueKind::ModalFocusBleed {
                node.impact = Some(Severity::Critical);
            }
            node
        })
        .collect();

    let severity = if has_bleed {
        Severity::Critical
    } else {
        Severity::Serious
    };

    Ok(Some(build_finding(
        "focus-order",
        "Focus order must be predictable and escapable",
        "Keyboard focus must follow the reading order, stay inside open dialogs, and never get trapped.",
        severity,
        HELP_URL,
        nodes,
        url,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(selector: &str, top: f64) -> FocusStep {
        FocusStep {
            selector: selector.to_string(),
            html: format!("<a id=\"{}\"></a>", selector.trim_start_matches('#')),
            top,
            modal_open: false,
            inside_modal: false,
        }
    }

    #[test]
    fn test_direct_cycle_is_a_trap() {
        // btn1 → btn2 → btn1 within 3 presses, no wrap in between
        let mut d = FocusOrderDetector::default();
        assert!(d.observe(1, &step("#btn1", 0.0)));
        assert!(d.observe(2, &step("#btn2", 20.0)));
        assert!(!d.observe(3, &step("#btn1", 0.0)));
        let issues = d.into_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::FocusTrap);
        // Selector is the first revisited element
        assert_eq!(issues[0].selector, "#btn1");
    }

    #[test]
    fn test_wrap_through_chrome_is_safe() {
        let mut d = FocusOrderDetector::default();
        assert!(d.observe(1, &step("#a", 0.0)));
        assert!(d.observe(2, &step("#b", 10.0)));
        d.observe_wrap(3);
        assert!(d.observe(4, &step("#a", 0.0)));
        assert!(d.observe(5, &step("#b", 10.0)));
        let issues = d.into_issues();
        assert!(issues.iter().all(|i| i.kind != IssueKind::FocusTrap));
    }

    #[test]
    fn test_safe_cycle_length_reused() {
        let mut d = FocusOrderDetector::default();
        assert!(d.observe(1, &step("#a", 0.0)));
        assert!(d.observe(2, &step("#b", 10.0)));
        assert!(d.observe(3, &step("#c", 20.0)));
        d.observe_wrap(4);
        assert!(d.observe(5, &step("#a", 0.0))); // wrap, safe cycle = 4
        // Second lap with the same cycle length and no wrap flag: matches
        // the recorded safe cycle, so still no trap
        assert!(d.observe(9, &step("#a", 0.0)));
        assert!(d
            .into_issues()
            .iter()
            .all(|i| i.kind != IssueKind::FocusTrap));
    }

    #[test]
    fn test_visual_focus_jump_upward() {
        let mut d = FocusOrderDetector::default();
        assert!(d.observe(1, &step("#low", 900.0)));
        assert!(d.observe(2, &step("#high", 100.0)));
        let issues = d.into_issues();
        assert!(issues.iter().any(|i| i.kind == IssueKind::VisualFocusJump));
    }

    #[test]
    fn test_small_upward_move_is_fine() {
        let mut d = FocusOrderDetector::default();
        assert!(d.observe(1, &step("#a", 200.0)));
        assert!(d.observe(2, &step("#b", 150.0)));
        assert!(d.into_issues().is_empty());
    }

    #[test]
    fn test_jump_not_reported_across_wrap() {
        let mut d = FocusOrderDetector::default();
        assert!(d.observe(1, &step("#bottom", 2000.0)));
        d.observe_wrap(2);
        // Back to the top of the page after a wrap is expected
        assert!(d.observe(3, &step("#top", 0.0)));
        assert!(d.into_issues().is_empty());
    }

    #[test]
    fn test_modal_focus_bleed_is_critical_node() {
        let mut d = FocusOrderDetector::default();
        let mut s = step("#outside", 10.0);
        s.modal_open = true;
        s.inside_modal = false;
        assert!(d.observe(1, &s));
        let issues = d.into_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::ModalFocusBleed);
    }

    #[test]
    fn test_dedup_by_kind_and_selector() {
        let mut d = FocusOrderDetector::default();
        for i in 1..=3 {
            let mut s = step(if i % 2 == 0 { "#x" } else { "#outside" }, 10.0 * i as f64);
            s.modal_open = true;
            d.observe(i, &s);
        }
        // Bleeds collapse to one per distinct selector
        let issues = d.into_issues();
        let bleeds = issues
            .iter()
            .filter(|i| i.kind == IssueKind::ModalFocusBleed)
            .count();
        assert_eq!(bleeds, 2);
    }
}
