//! Violation normalization
//!
//! Folds rules-engine output and custom probe findings into the report
//! taxonomy: severity buckets, per-node labels and friendly selectors,
//! element fingerprints, and one action item per rule.

use chrono::Utc;
use scraper::Html;
use url::Url;

use super::guidance::guidance_for;
use super::score::{priority_label, priority_score};
use super::types::{
    ActRuleRef, ActionItem, AuditReport, EngineMeta, HumanReadable, Severity, SeverityBuckets,
    Stats, Violation, ViolationNode, WcagLevel,
};
use crate::engine::{EngineResult, EngineViolation};

/// Tags the engine marks generic containers with; never useful as a
/// friendly selector on their own.
const GENERIC_TAGS: &[&str] = &["html", "body", "div", "span", "section", "article"];

/// Output of one custom probe, ready to merge into a report
#[derive(Debug, Clone, Default)]
pub struct ProbeFindings {
    pub violations: Vec<Violation>,
    pub action_items: Vec<ActionItem>,
}

impl ProbeFindings {
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty() && self.action_items.is_empty()
    }
}

/// Derive a human-friendly element label from an HTML snippet
///
/// Name source order: aria-label, alt, placeholder, title, visible text.
/// Role comes from the tag. Result reads like `Button "Sign in"`.
pub fn derive_element_label(html: &str) -> Option<String> {
    let fragment = Html::parse_fragment(html);
    let root = fragment
        .root_element()
        .child_elements()
        .next()?;
    let el = root.value();

    let tag = el.name().to_ascii_lowercase();
    let input_type = el
        .attr("type")
        .map(|t| t.to_ascii_lowercase())
        .unwrap_or_default();

    let role = match tag.as_str() {
        "button" => "Button",
        "input" if matches!(input_type.as_str(), "button" | "submit" | "reset") => "Button",
        "a" => "Link",
        "input" | "textarea" | "select" => "Form field",
        _ => "Element",
    };

    let name = el
        .attr("aria-label")
        .or_else(|| el.attr("alt"))
        .or_else(|| el.attr("placeholder"))
        .or_else(|| el.attr("title"))
        .map(str::to_string)
        .unwrap_or_else(|| {
            root.text().collect::<Vec<_>>().join(" ")
        });
    let name = collapse_whitespace(&name);

    if name.is_empty() {
        Some(role.to_string())
    } else {
        Some(format!("{} \"{}\"", role, name))
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when a selector segment is anchored by an id or a non-generic
/// class-prefixed tag.
fn is_friendly_segment(segment: &str) -> bool {
    if segment.contains('#') {
        return true;
    }
    if let Some(dot) = segment.find('.') {
        let tag = &segment[..dot];
        return !tag.is_empty()
            && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !GENERIC_TAGS.contains(&tag.to_ascii_lowercase().as_str());
    }
    false
}

/// Derive a short, human-friendly CSS selector
///
/// Walks the engine target chain from the deepest entry backwards and picks
/// the first id-anchored or class-prefixed segment. Falls back to parsing
/// the snippet, then to the truncated full target.
pub fn derive_friendly_selector(target: &[String], html: &str) -> Option<String> {
    for entry in target.iter().rev() {
        for segment in entry.split_whitespace().rev() {
            if segment == ">" {
                continue;
            }
            if is_friendly_segment(segment) {
                return Some(segment.to_string());
            }
        }
    }

    // Snippet fallback: tag#id, then tag.class.class
    let fragment = Html::parse_fragment(html);
    if let Some(root) = fragment.root_element().child_elements().next() {
        let el = root.value();
        let tag = el.name().to_ascii_lowercase();
        if let Some(id) = el.attr("id") {
            if !id.is_empty() {
                return Some(format!("{}#{}", tag, id));
            }
        }
        if let Some(classes) = el.attr("class") {
            let picked: Vec<&str> = classes.split_whitespace().take(2).collect();
            if !picked.is_empty() {
                return Some(format!("{}.{}", tag, picked.join(".")));
            }
        }
    }

    // Last resort: full target, truncated
    let full = target.last()?;
    if full.chars().count() > 80 {
        let truncated: String = full.chars().take(80).collect();
        Some(format!("{}…", truncated))
    } else {
        Some(full.clone())
    }
}

/// Deterministic element fingerprint, stable across runs
///
/// `lower(path) + "::" + lower(selector) + "::" + lower(label)`.
pub fn fingerprint(url: &Url, selector: &str, label: &str) -> String {
    format!(
        "{}::{}::{}",
        url.path().to_lowercase(),
        selector.to_lowercase(),
        label.to_lowercase()
    )
}

/// Component name, when the snippet exposes one via data attributes
fn derive_component(html: &str) -> Option<String> {
    let fragment = Html::parse_fragment(html);
    let root = fragment.root_element().child_elements().next()?;
    let el = root.value();
    el.attr("data-component")
        .or_else(|| el.attr("data-testid"))
        .map(str::to_string)
}

/// Parse a `wcagXYZ` engine tag into an "X.Y.Z" criterion string
fn criterion_from_tags(tags: &[String]) -> Option<String> {
    for tag in tags {
        let digits = tag.strip_prefix("wcag")?;
        if digits.len() >= 3 && digits.chars().all(|c| c.is_ascii_digit()) {
            let (a, rest) = digits.split_at(1);
            let (b, c) = rest.split_at(1);
            return Some(format!("{}.{}.{}", a, b, c));
        }
    }
    None
}

/// Derive the WCAG conformance level from engine tags
fn level_from_tags(tags: &[String]) -> Option<WcagLevel> {
    let mut level = None;
    for tag in tags {
        match tag.as_str() {
            "wcag2a" | "wcag21a" => level = level.or(Some(WcagLevel::A)),
            "wcag2aa" | "wcag21aa" | "wcag22aa" => level = level.or(Some(WcagLevel::AA)),
            "wcag2aaa" => level = level.or(Some(WcagLevel::AAA)),
            _ => {}
        }
    }
    level
}

/// Extract ACT rule ids the engine exposes as 6-hex-char tags
fn act_from_tags(tags: &[String]) -> Vec<ActRuleRef> {
    tags.iter()
        .filter(|t| t.len() == 6 && t.chars().all(|c| c.is_ascii_hexdigit()))
        .map(|t| ActRuleRef::new(t))
        .collect()
}

fn map_node(raw: &crate::engine::EngineNode) -> ViolationNode {
    ViolationNode {
        html: raw.html.clone(),
        target: raw.target.clone(),
        failure_summary: raw.failure_summary.clone(),
        selector: derive_friendly_selector(&raw.target, &raw.html),
        element_label: derive_element_label(&raw.html),
        component: derive_component(&raw.html),
        bounding_box: None,
        impact: raw.impact.as_deref().map(Severity::parse_lenient),
    }
}

fn map_violation(raw: &EngineViolation) -> Violation {
    let severity = raw
        .impact
        .as_deref()
        .map(Severity::parse_lenient)
        .unwrap_or(Severity::Moderate);
    let nodes: Vec<ViolationNode> = raw.nodes.iter().map(map_node).collect();
    let guidance = guidance_for(&raw.id);

    let mut act = act_from_tags(&raw.tags);
    if act.is_empty() {
        act = guidance.act.iter().map(|id| ActRuleRef::new(id)).collect();
    }

    Violation::new(
        raw.id.clone(),
        raw.help.clone(),
        raw.description.clone(),
        severity,
        raw.help_url.clone(),
        nodes,
    )
    .with_fix(guidance.fix)
    .with_act_rules(act)
}

/// Build one action item for a violated rule, using the first node as the
/// example element.
pub fn action_item_for(violation: &Violation, url: &Url, tags: &[String]) -> ActionItem {
    let guidance = guidance_for(&violation.id);
    let wcag = guidance
        .wcag
        .map(str::to_string)
        .or_else(|| criterion_from_tags(tags));
    let level = guidance.level.or_else(|| level_from_tags(tags));

    let first = violation.nodes.first();
    let element_label = first.and_then(|n| n.element_label.clone());
    let selector = first.and_then(|n| n.selector.clone());
    let fp = match (&selector, &element_label) {
        (Some(sel), Some(label)) => Some(fingerprint(url, sel, label)),
        (Some(sel), None) => Some(fingerprint(url, sel, "")),
        _ => None,
    };

    let score = priority_score(violation.severity, level, violation.count);
    ActionItem {
        rule_id: violation.id.clone(),
        impact: violation.severity,
        priority: priority_label(score).to_string(),
        priority_score: Some(score),
        category: guidance.category.to_string(),
        what: guidance.what.to_string(),
        fix: violation
            .suggested_fix
            .clone()
            .unwrap_or_else(|| guidance.fix.to_string()),
        example_url: url.to_string(),
        example_target: first.and_then(|n| n.target.last().cloned()),
        wcag_criterion: wcag,
        act_rules: violation.act_rules.clone(),
        element_label,
        fingerprint: fp,
        component: first.and_then(|n| n.component.clone()),
        occurrences: violation.count,
    }
}

/// Order action items by `(priorityScore DESC, occurrences DESC)` and
/// refresh the top-3 issue titles.
fn finalize_human_readable(report: &mut AuditReport) {
    report.human_readable.action_items.sort_by(|a, b| {
        let pa = a.priority_score.unwrap_or(0.0);
        let pb = b.priority_score.unwrap_or(0.0);
        pb.partial_cmp(&pa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.occurrences.cmp(&a.occurrences))
    });

    let mut top = Vec::new();
    for item in report.human_readable.action_items.iter().take(3) {
        if let Some(v) = report.violations.iter().find(|v| v.id == item.rule_id) {
            top.push(v.title.clone());
        } else {
            top.push(item.rule_id.clone());
        }
    }
    report.human_readable.top_issues = top;
}

/// Map a rules-engine result onto a skeleton `AuditReport`
pub fn map_engine_result(url: &Url, result: &EngineResult) -> AuditReport {
    let mut buckets = SeverityBuckets::default();
    let mut action_items = Vec::new();

    for raw in &result.violations {
        let violation = map_violation(raw);
        action_items.push(action_item_for(&violation, url, &raw.tags));
        buckets.push(violation);
    }

    let mut report = AuditReport {
        url: url.to_string(),
        timestamp: Utc::now(),
        score: 100,
        meta: EngineMeta {
            browser_version: result.browser_version.clone(),
            engine_version: result.engine_version.clone(),
        },
        violations: buckets,
        stats: Stats::default(),
        human_readable: HumanReadable {
            action_items,
            top_issues: Vec::new(),
            summary: None,
        },
        performance: None,
        keyboard_navigation: None,
        heading_structure: None,
        broken_links: None,
        page_dimensions: None,
        domain_hash: None,
        screenshot: None,
    };

    report.recompute();
    finalize_human_readable(&mut report);
    report
}

/// Append custom probe findings to a report, then recompute stats, score
/// and the human-readable ordering.
pub fn merge_findings(report: &mut AuditReport, findings: Vec<ProbeFindings>) {
    for finding in findings {
        for violation in finding.violations {
            report.violations.push(violation);
        }
        report
            .human_readable
            .action_items
            .extend(finding.action_items);
    }
    report.recompute();
    finalize_human_readable(report);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineNode;

    fn test_url() -> Url {
        Url::parse("https://example.com/Products/Shoes").unwrap()
    }

    #[test]
    fn test_label_from_aria_label() {
        let label = derive_element_label("<button aria-label=\"Close dialog\">×</button>");
        assert_eq!(label.as_deref(), Some("Button \"Close dialog\""));
    }

    #[test]
    fn test_label_from_alt() {
        let label = derive_element_label("<img src=\"logo.png\" alt=\"Acme logo\">");
        assert_eq!(label.as_deref(), Some("Element \"Acme logo\""));
    }

    #[test]
    fn test_label_from_visible_text() {
        let label = derive_element_label("<a href=\"/signin\">  Sign \n in  </a>");
        assert_eq!(label.as_deref(), Some("Link \"Sign in\""));
    }

    #[test]
    fn test_label_input_submit_is_button() {
        let label = derive_element_label("<input type=\"submit\" title=\"Send\">");
        assert_eq!(label.as_deref(), Some("Button \"Send\""));
    }

    #[test]
    fn test_label_form_field() {
        let label = derive_element_label("<input type=\"text\" placeholder=\"Your email\">");
        assert_eq!(label.as_deref(), Some("Form field \"Your email\""));
    }

    #[test]
    fn test_label_role_only_when_nameless() {
        let label = derive_element_label("<button></button>");
        assert_eq!(label.as_deref(), Some("Button"));
    }

    #[test]
    fn test_friendly_selector_prefers_id() {
        let target = vec!["html > body > div".to_string(), "div #signup-form a".to_string()];
        let sel = derive_friendly_selector(&target, "<a></a>");
        assert_eq!(sel.as_deref(), Some("#signup-form"));
    }

    #[test]
    fn test_friendly_selector_skips_generic_tags() {
        let target = vec!["div.wrapper nav.main-nav".to_string()];
        let sel = derive_friendly_selector(&target, "<a></a>");
        assert_eq!(sel.as_deref(), Some("nav.main-nav"));
    }

    #[test]
    fn test_friendly_selector_snippet_fallback() {
        let target = vec!["div > div > div".to_string()];
        let sel = derive_friendly_selector(&target, "<a id=\"cta\" href=\"/\">Go</a>");
        assert_eq!(sel.as_deref(), Some("a#cta"));
    }

    #[test]
    fn test_friendly_selector_truncates_last_resort() {
        let long = "div ".repeat(40).trim_end().to_string();
        let sel = derive_friendly_selector(std::slice::from_ref(&long), "<div></div>").unwrap();
        assert!(sel.ends_with('…'));
        assert!(sel.chars().count() <= 81);
    }

    #[test]
    fn test_fingerprint_normalization() {
        let url = test_url();
        let fp = fingerprint(&url, "NAV.Main", "Link \"Home\"");
        assert_eq!(fp, "/products/shoes::nav.main::link \"home\"");
    }

    #[test]
    fn test_fingerprint_equality_is_triple_equality() {
        let url = test_url();
        assert_eq!(
            fingerprint(&url, "a#cta", "Link \"Go\""),
            fingerprint(&url, "A#CTA", "link \"go\"")
        );
        assert_ne!(
            fingerprint(&url, "a#cta", "Link \"Go\""),
            fingerprint(&url, "a#cta2", "Link \"Go\"")
        );
    }

    #[test]
    fn test_criterion_from_tags() {
        let tags = vec!["cat.text-alternatives".to_string(), "wcag111".to_string()];
        assert_eq!(criterion_from_tags(&tags).as_deref(), Some("1.1.1"));
        let tags = vec!["wcag1412".to_string()];
        assert_eq!(criterion_from_tags(&tags).as_deref(), Some("1.4.12"));
    }

    #[test]
    fn test_act_ids_from_tags() {
        let tags = vec!["wcag2a".to_string(), "23a2a8".to_string(), "best-practice".to_string()];
        let act = act_from_tags(&tags);
        assert_eq!(act.len(), 1);
        assert_eq!(act[0].id, "23a2a8");
    }

    fn engine_result_with_image_alt() -> EngineResult {
        EngineResult {
            browser_version: "HeadlessChrome/126.0".to_string(),
            engine_version: "4.10.0".to_string(),
            violations: vec![EngineViolation {
                id: "image-alt".to_string(),
                impact: Some("critical".to_string()),
                help: "Images must have alternate text".to_string(),
                description: "Ensures <img> elements have alternate text".to_string(),
                help_url: "https://dequeuniversity.com/rules/axe/4.10/image-alt".to_string(),
                tags: vec!["wcag2a".to_string(), "wcag111".to_string()],
                nodes: vec![EngineNode {
                    html: "<img src=\"logo.png\">".to_string(),
                    target: vec!["img".to_string()],
                    failure_summary: Some("Element has no alt attribute".to_string()),
                    impact: Some("critical".to_string()),
                }],
            }],
        }
    }

    #[test]
    fn test_map_engine_result_image_alt() {
        let url = Url::parse("https://example.com/").unwrap();
        let report = map_engine_result(&url, &engine_result_with_image_alt());

        assert_eq!(report.violations.critical.len(), 1);
        assert_eq!(report.violations.critical[0].id, "image-alt");
        assert_eq!(report.score, 95);
        assert_eq!(report.stats.total_violations, 1);
        assert_eq!(report.stats.critical_count, 1);

        let item = &report.human_readable.action_items[0];
        assert_eq!(item.category, "Graphics");
        assert_eq!(item.wcag_criterion.as_deref(), Some("1.1.1"));
        assert_eq!(report.human_readable.top_issues.len(), 1);
    }

    #[test]
    fn test_zero_violations_is_perfect_score() {
        let url = Url::parse("https://example.com/").unwrap();
        let result = EngineResult {
            browser_version: "HeadlessChrome/126.0".to_string(),
            engine_version: "4.10.0".to_string(),
            violations: vec![],
        };
        let report = map_engine_result(&url, &result);
        assert_eq!(report.score, 100);
        assert!(report.violations.is_empty());
        assert_eq!(report.stats.total_violations, 0);
        assert!(report.human_readable.top_issues.is_empty());
    }

    #[test]
    fn test_merge_findings_recomputes_stats() {
        let url = Url::parse("https://example.com/").unwrap();
        let mut report = map_engine_result(&url, &engine_result_with_image_alt());
        assert_eq!(report.score, 95);

        let violation = Violation::new(
            "meta-viewport",
            "Zooming must not be disabled",
            "The viewport meta tag restricts zooming",
            Severity::Critical,
            "https://www.w3.org/WAI/WCAG21/Understanding/resize-text.html",
            vec![ViolationNode {
                html: "<meta name=\"viewport\" content=\"user-scalable=no\">".to_string(),
                target: vec!["meta[name=viewport]".to_string()],
                failure_summary: None,
                selector: None,
                element_label: None,
                component: None,
                bounding_box: None,
                impact: None,
            }],
        );
        let item = action_item_for(&violation, &url, &[]);
        merge_findings(
            &mut report,
            vec![ProbeFindings {
                violations: vec![violation],
                action_items: vec![item],
            }],
        );

        assert_eq!(report.stats.total_violations, 2);
        assert_eq!(report.stats.critical_count, 2);
        assert_eq!(report.score, 90);
        assert_eq!(report.human_readable.action_items.len(), 2);
    }
}
