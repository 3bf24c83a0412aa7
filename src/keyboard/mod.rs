//! Keyboard-walk analyzer
//!
//! Simulates up to 60 Tab presses and reports focus-visibility and
//! focus-order issues. The walk terminates early on a lost focus or a
//! confirmed focus loop.

use std::collections::HashMap;
use std::time::Duration;

use chromiumoxide::Page;
use tracing::{debug, info};

use crate::browser::{eval_json, press_tab};
use crate::error::Result;
use crate::report::{KeyboardIssue, KeyboardIssueKind, KeyboardReport};

const MAX_STEPS: usize = 60;
const STEP_DELAY_MS: u64 = 40;
/// A selector revisited within this many steps counts as a loop, unless
/// the revisit is the page wrapping back to its first focusable.
const LOOP_WINDOW: usize = 10;

/// State of the focused element after one Tab press
#[derive(Debug, Clone, Default)]
pub(crate) struct TabStep {
    pub selector: Option<String>,
    pub html: Option<String>,
    /// Viewport-relative rect
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub outline_visible: bool,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl TabStep {
    fn is_offscreen(&self) -> bool {
        self.width == 0.0
            || self.height == 0.0
            || self.x + self.width <= 0.0
            || self.y + self.height <= 0.0
            || self.x >= self.viewport_width
            || self.y >= self.viewport_height
    }
}

/// Incremental issue detection over the Tab sequence
#[derive(Debug, Default)]
pub(crate) struct WalkDetector {
    issues: Vec<KeyboardIssue>,
    last_seen: HashMap<String, usize>,
    first_selector: Option<String>,
}

impl WalkDetector {
    /// Feed one step; returns false when the walk must stop
    pub fn observe(&mut self, index: usize, step: &TabStep) -> bool {
        let Some(selector) = step.selector.clone() else {
            self.issues.push(KeyboardIssue {
                step: index,
                kind: KeyboardIssueKind::FocusLost,
                selector: None,
                html: None,
                description: "Focus disappeared after pressing Tab; no element is active."
                    .to_string(),
                wcag: "2.4.3".to_string(),
                recommendation: "Ensure every Tab press lands on a visible, focusable element."
                    .to_string(),
            });
            return false;
        };

        if self.first_selector.is_none() {
            self.first_selector = Some(selector.clone());
        }

        if step.is_offscreen() {
            self.issues.push(KeyboardIssue {
                step: index,
                kind: KeyboardIssueKind::OffscreenFocus,
                selector: Some(selector.clone()),
                html: step.html.clone(),
                description: "The focused element is invisible or entirely outside the viewport."
                    .to_string(),
                wcag: "2.4.7".to_string(),
                recommendation:
                    "Keep focusable elements visible, or remove them from the tab order with tabindex=\"-1\"."
                        .to_string(),
            });
        } else if !step.outline_visible {
            self.issues.push(KeyboardIssue {
                step: index,
                kind: KeyboardIssueKind::NoVisibleFocus,
                selector: Some(selector.clone()),
                html: step.html.clone(),
                description: "The focused element shows no visible focus indicator.".to_string(),
                wcag: "2.4.7".to_string(),
                recommendation:
                    "Keep an outline or equally clear focus style on every interactive element."
                        .to_string(),
            });
        }

        if let Some(&previous) = self.last_seen.get(&selector) {
            let wrapped = self.first_selector.as_deref() == Some(selector.as_str());
            if !wrapped && index - previous < LOOP_WINDOW {
                self.issues.push(KeyboardIssue {
                    step: index,
                    kind: KeyboardIssueKind::FocusLoop,
                    selector: Some(selector.clone()),
                    html: step.html.clone(),
                    description: format!(
                        "Focus returned to the same element after {} Tab presses.",
                        index - previous
                    ),
                    wcag: "2.1.2".to_string(),
                    recommendation:
                        "Make sure repeated Tab presses eventually leave every widget.".to_string(),
                });
                return false;
            }
        }
        self.last_seen.insert(selector, index);
        true
    }

    pub fn into_issues(self) -> Vec<KeyboardIssue> {
        self.issues
    }
}

const COUNT_FOCUSABLES_JS: &str = r#"
(() => {
    const selector = 'a[href], button, input, select, textarea, [tabindex]';
    let count = 0;
    for (const el of document.querySelectorAll(selector)) {
        if (el.tabIndex < 0 || el.disabled) continue;
        const style = window.getComputedStyle(el);
        if (style.display === 'none' || style.visibility === 'hidden') continue;
        count++;
    }
    return JSON.stringify({ count });
})()
"#;

const RESET_FOCUS_JS: &str = r#"
(() => {
    if (document.activeElement && document.activeElement !== document.body) {
        document.activeElement.blur();
    }
    window.scrollTo(0, 0);
    document.body.focus();
    return JSON.stringify({ ok: true });
})()
"#;

const READ_ACTIVE_JS: &str = r#"
(() => {
    let el = document.activeElement;
    while (el && el.shadowRoot && el.shadowRoot.activeElement) {
        el = el.shadowRoot.activeElement;
    }
    if (!el || el === document.body || el === document.documentElement) {
        return JSON.stringify({ active: false });
    }
    const selectorFor = (node) => {
        const parts = [];
        while (node && node.nodeType === 1 && parts.length < 6) {
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
    const style = window.getComputedStyle(el);
    const outlineAbsent = style.outlineStyle === 'none'
        || parseFloat(style.outlineWidth) === 0
        || style.outlineColor === 'transparent'
        || style.outlineColor === 'rgba(0, 0, 0, 0)';
    return JSON.stringify({
        active: true,
        selector: selectorFor(el),
        html: el.outerHTML.slice(0, 300),
        x: rect.x, y: rect.y, width: rect.width, height: rect.height,
        outlineVisible: !outlineAbsent,
        viewportWidth: window.innerWidth,
        viewportHeight: window.innerHeight
    });
})()
"#;

/// Simulate Tab traversal and report keyboard-navigation issues
pub async fn walk(page: &Page) -> Result<KeyboardReport> {
    let count = eval_json(page, COUNT_FOCUSABLES_JS).await?["count"]
        .as_u64()
        .unwrap_or(0);
    if count == 0 {
        info!("Keyboard walk: page has no focusable elements");
        return Ok(KeyboardReport {
            steps_taken: 0,
            issues: vec![KeyboardIssue {
                step: 0,
                kind: KeyboardIssueKind::NoFocusableElements,
                selector: None,
                html: None,
                description: "The page contains no keyboard-focusable elements.".to_string(),
                wcag: "2.1.1".to_string(),
                recommendation:
                    "Interactive content must be reachable with the keyboard; add links, buttons or form fields."
                        .to_string(),
            }],
        });
    }

    eval_json(page, RESET_FOCUS_JS).await?;

    let mut detector = WalkDetector::default();
    let mut steps_taken = 0;
    for index in 1..=MAX_STEPS {
        press_tab(page).await?;
        tokio::time::sleep(Duration::from_millis(STEP_DELAY_MS)).await;

        let raw = eval_json(page, READ_ACTIVE_JS).await?;
        let step = if raw["active"].as_bool().unwrap_or(false) {
            TabStep {
                selector: raw["selector"].as_str().map(str::to_string),
                html: raw["html"].as_str().map(str::to_string),
                x: raw["x"].as_f64().unwrap_or(0.0),
                y: raw["y"].as_f64().unwrap_or(0.0),
                width: raw["width"].as_f64().unwrap_or(0.0),
                height: raw["height"].as_f64().unwrap_or(0.0),
                outline_visible: raw["outlineVisible"].as_bool().unwrap_or(true),
                viewport_width: raw["viewportWidth"].as_f64().unwrap_or(1920.0),
                viewport_height: raw["viewportHeight"].as_f64().unwrap_or(1080.0),
            }
        } else {
            TabStep::default()
        };

        steps_taken = index;
        if !detector.observe(index, &step) {
            debug!("Keyboard walk stopped at step {}", index);
            break;
        }
    }

    let issues = detector.into_issues();
    info!(
        "Keyboard walk complete: {} steps, {} issues",
        steps_taken,
        issues.len()
    );
    Ok(KeyboardReport {
        steps_taken,
        issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(selector: &str) -> TabStep {
        TabStep {
            selector: Some(selector.to_string()),
            html: Some(format!("<a id=\"{}\"></a>", selector)),
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 20.0,
            outline_visible: true,
            viewport_width: 1920.0,
            viewport_height: 1080.0,
        }
    }

    #[test]
    fn test_focus_lost_stops_walk() {
        let mut detector = WalkDetector::default();
        assert!(detector.observe(1, &step("#a")));
        assert!(!detector.observe(2, &TabStep::default()));
        let issues = detector.into_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, KeyboardIssueKind::FocusLost);
        assert_eq!(issues[0].step, 2);
    }

    #[test]
    fn test_focus_loop_detected() {
        let mut detector = WalkDetector::default();
        assert!(detector.observe(1, &step("#a")));
        assert!(detector.observe(2, &step("#b")));
        assert!(!detector.observe(3, &step("#b")));
        let issues = detector.into_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, KeyboardIssueKind::FocusLoop);
        assert_eq!(issues[0].selector.as_deref(), Some("#b"));
    }

    #[test]
    fn test_page_wrap_is_not_a_loop() {
        let mut detector = WalkDetector::default();
        assert!(detector.observe(1, &step("#first")));
        assert!(detector.observe(2, &step("#second")));
        assert!(detector.observe(3, &step("#third")));
        // Wrapping back to the first focusable is legitimate
        assert!(detector.observe(4, &step("#first")));
        assert!(detector.into_issues().is_empty());
    }

    #[test]
    fn test_offscreen_focus() {
        let mut detector = WalkDetector::default();
        let mut s = step("#hidden");
        s.x = -500.0;
        s.width = 100.0;
        assert!(detector.observe(1, &s));
        let issues = detector.into_issues();
        assert_eq!(issues[0].kind, KeyboardIssueKind::OffscreenFocus);
    }

    #[test]
    fn test_zero_size_rect_is_offscreen() {
        let mut s = step("#zero");
        s.width = 0.0;
        assert!(s.is_offscreen());
    }

    #[test]
    fn test_no_visible_focus() {
        let mut detector = WalkDetector::default();
        let mut s = step("#plain");
        s.outline_visible = false;
        assert!(detector.observe(1, &s));
        let issues = detector.into_issues();
        assert_eq!(issues[0].kind, KeyboardIssueKind::NoVisibleFocus);
        assert_eq!(issues[0].wcag, "2.4.7");
    }
}
