//! Custom ACT-style probe suite
//!
//! A registry of independent in-browser probes that complement the rules
//! engine. Each probe is self-contained, may evaluate code in the page,
//! and must not leave state behind that other probes can observe (viewport
//! changes are restored). A probe failure is logged and skipped; the scan
//! continues.

mod autoplay;
mod carousel;
mod focus_order;
mod form_errors;
mod landmarks;
mod meta_viewport;
mod modal_focus;
mod orientation;
mod skip_link;
mod suspicious_alt;

use chromiumoxide::Page;
use tracing::{debug, warn};
use url::Url;

use crate::browser::DeviceProfile;
use crate::error::Result;
use crate::report::{
    action_item_for, derive_element_label, derive_friendly_selector, guidance_for, ActRuleRef,
    ProbeFindings, Severity, Violation, ViolationNode,
};

pub use suspicious_alt::AltIssueKind;

/// Build a `ViolationNode` from a snippet captured in the page
pub(crate) fn node_from_snippet(
    html: impl Into<String>,
    target: impl Into<String>,
    failure_summary: impl Into<String>,
) -> ViolationNode {
    let html = html.into();
    let target = vec![target.into()];
    ViolationNode {
        selector: derive_friendly_selector(&target, &html),
        element_label: derive_element_label(&html),
        failure_summary: Some(failure_summary.into()),
        component: None,
        bounding_box: None,
        impact: None,
        html,
        target,
    }
}

/// Assemble the findings for one probe rule: a violation carrying the
/// affected nodes plus a single action item for the rule.
pub(crate) fn build_finding(
    rule_id: &str,
    title: &str,
    description: &str,
    severity: Severity,
    help_url: &str,
    nodes: Vec<ViolationNode>,
    url: &Url,
) -> ProbeFindings {
    let guidance = guidance_for(rule_id);
    let violation = Violation::new(rule_id, title, description, severity, help_url, nodes)
        .with_fix(guidance.fix)
        .with_act_rules(guidance.act.iter().map(|id| ActRuleRef::new(id)).collect());
    let item = action_item_for(&violation, url, &[]);
    ProbeFindings {
        violations: vec![violation],
        action_items: vec![item],
    }
}

fn guard(name: &str, outcome: Result<Option<ProbeFindings>>) -> Option<ProbeFindings> {
    match outcome {
        Ok(findings) => findings.filter(|f| !f.is_empty()),
        Err(e) => {
            warn!("Probe '{}' failed: {}", name, e);
            None
        }
    }
}

/// Run every probe in sequence against the settled page
///
/// `profile` supplies the viewport to restore after probes that change it.
pub async fn run_all(page: &Page, url: &Url, profile: DeviceProfile) -> Vec<ProbeFindings> {
    let mut findings = Vec::new();

    debug!("Running custom probe suite...");
    if let Some(f) = guard("focus-order", focus_order::check(page, url).await) {
        findings.push(f);
    }
    if let Some(f) = guard("landmarks", landmarks::check(page, url).await) {
        findings.push(f);
    }
    if let Some(f) = guard("skip-link", skip_link::check(page, url).await) {
        findings.push(f);
    }
    if let Some(f) = guard("modal-focus", modal_focus::check(page, url).await) {
        findings.push(f);
    }
    if let Some(f) = guard("carousel-autoplay", carousel::check(page, url).await) {
        findings.push(f);
    }
    if let Some(f) = guard("meta-viewport", meta_viewport::check(page, url).await) {
        findings.push(f);
    }
    if let Some(f) = guard("orientation-lock", orientation::check(page, url, profile).await) {
        findings.push(f);
    }
    if let Some(f) = guard("autoplay-media", autoplay::check(page, url).await) {
        findings.push(f);
    }
    if let Some(f) = guard("form-errors", form_errors::check(page, url).await) {
        findings.push(f);
    }
    if let Some(f) = guard("suspicious-alt", suspicious_alt::check(page, url).await) {
        findings.push(f);
    }

    debug!("Probe suite produced {} findings", findings.len());
    findings
}
