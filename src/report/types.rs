//! Core report types
//!
//! The `AuditReport`/`CrawlSummary` JSON contract. Severity buckets partition
//! violations; stats are recomputed whenever a bucket changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity levels for violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Critical - blocks users completely
    Critical,
    /// Serious - major barrier for users
    Serious,
    /// Moderate - degraded experience
    Moderate,
    /// Minor - small inconvenience
    Minor,
}

impl Severity {
    /// Score deduction weight per affected node
    pub fn score_weight(&self) -> f64 {
        match self {
            Severity::Critical => 5.0,
            Severity::Serious => 3.0,
            Severity::Moderate => 1.0,
            Severity::Minor => 0.5,
        }
    }

    /// Impact weight for priority ranking
    pub fn priority_weight(&self) -> f64 {
        match self {
            Severity::Critical => 4.0,
            Severity::Serious => 3.0,
            Severity::Moderate => 2.0,
            Severity::Minor => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Serious => "serious",
            Severity::Moderate => "moderate",
            Severity::Minor => "minor",
        }
    }

    /// Parse an engine impact string, defaulting to moderate for unknown values
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "critical" => Severity::Critical,
            "serious" => Severity::Serious,
            "minor" => Severity::Minor,
            _ => Severity::Moderate,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WCAG conformance levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WcagLevel {
    A,
    AA,
    AAA,
}

impl WcagLevel {
    /// WCAG weight for priority ranking; unknown levels weigh 1
    pub fn priority_weight(&self) -> f64 {
        match self {
            WcagLevel::A => 3.0,
            WcagLevel::AA => 2.0,
            WcagLevel::AAA => 1.0,
        }
    }
}

impl std::fmt::Display for WcagLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WcagLevel::A => write!(f, "A"),
            WcagLevel::AA => write!(f, "AA"),
            WcagLevel::AAA => write!(f, "AAA"),
        }
    }
}

/// Reference to a W3C ACT rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActRuleRef {
    /// 6-hex-char ACT rule id, e.g. "23a2a8"
    pub id: String,
    /// Canonical rule URL
    pub url: String,
}

impl ActRuleRef {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            url: format!("https://www.w3.org/WAI/standards-guidelines/act/rules/{}/", id),
        }
    }
}

/// Absolute bounding box of an element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One affected DOM node within a violation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationNode {
    /// HTML snippet of the offending element
    pub html: String,
    /// Target selector chain (one entry per shadow root traversed)
    pub target: Vec<String>,
    /// Engine failure summary, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_summary: Option<String>,
    /// Short human-friendly CSS selector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Element label, e.g. `Button "Sign in"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_label: Option<String>,
    /// Component name if the element belongs to a recognizable widget
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    /// Per-node impact overriding the parent violation severity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<Severity>,
}

/// One violated rule with all affected nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Rule id, e.g. "image-alt" or "carousel-autoplay"
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub help_url: String,
    /// Number of affected nodes; always equals `nodes.len()`
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub act_rules: Option<Vec<ActRuleRef>>,
    pub nodes: Vec<ViolationNode>,
}

impl Violation {
    /// Build a violation; `count` is derived from the node list
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        help_url: impl Into<String>,
        nodes: Vec<ViolationNode>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            severity,
            help_url: help_url.into(),
            count: nodes.len(),
            suggested_fix: None,
            act_rules: None,
            nodes,
        }
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }

    pub fn with_act_rules(mut self, rules: Vec<ActRuleRef>) -> Self {
        if !rules.is_empty() {
            self.act_rules = Some(rules);
        }
        self
    }
}

/// Violations partitioned into severity buckets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeverityBuckets {
    #[serde(default)]
    pub critical: Vec<Violation>,
    #[serde(default)]
    pub serious: Vec<Violation>,
    #[serde(default)]
    pub moderate: Vec<Violation>,
    #[serde(default)]
    pub minor: Vec<Violation>,
}

impl SeverityBuckets {
    /// Place a violation into the bucket matching its severity
    pub fn push(&mut self, violation: Violation) {
        match violation.severity {
            Severity::Critical => self.critical.push(violation),
            Severity::Serious => self.serious.push(violation),
            Severity::Moderate => self.moderate.push(violation),
            Severity::Minor => self.minor.push(violation),
        }
    }

    /// Iterate all violations across buckets, critical first
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.critical
            .iter()
            .chain(self.serious.iter())
            .chain(self.moderate.iter())
            .chain(self.minor.iter())
    }

    /// Sum of node counts across all buckets
    pub fn total_count(&self) -> usize {
        self.iter().map(|v| v.count).sum()
    }

    /// Sum of node counts in the critical bucket
    pub fn critical_count(&self) -> usize {
        self.critical.iter().map(|v| v.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.critical.is_empty()
            && self.serious.is_empty()
            && self.moderate.is_empty()
            && self.minor.is_empty()
    }
}

/// Aggregate violation statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_violations: usize,
    pub critical_count: usize,
}

/// Flattened remediation entry for downstream consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub rule_id: String,
    pub impact: Severity,
    /// Ordering label derived from the priority score
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_score: Option<f64>,
    pub category: String,
    /// What is wrong, in prose
    pub what: String,
    /// How to fix it, in prose
    pub fix: String,
    pub example_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_target: Option<String>,
    /// WCAG success criterion, e.g. "1.1.1"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wcag_criterion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub act_rules: Option<Vec<ActRuleRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Number of affected nodes across the rule
    pub occurrences: usize,
}

/// Human-readable remediation block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanReadable {
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    /// Top-3 issue titles by priority score
    #[serde(default)]
    pub top_issues: Vec<String>,
    /// Localized one-line conformance summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Engine and browser identification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineMeta {
    pub browser_version: String,
    pub engine_version: String,
}

/// Issue kinds the keyboard walk reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyboardIssueKind {
    NoFocusableElements,
    FocusLost,
    OffscreenFocus,
    NoVisibleFocus,
    FocusLoop,
}

/// One issue found during the simulated Tab traversal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardIssue {
    pub step: usize,
    #[serde(rename = "type")]
    pub kind: KeyboardIssueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    pub description: String,
    pub wcag: String,
    pub recommendation: String,
}

/// Result of the keyboard-walk analyzer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardReport {
    /// Number of Tab presses performed
    pub steps_taken: usize,
    pub issues: Vec<KeyboardIssue>,
}

/// Classification against the Core Web Vitals thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricRating {
    Good,
    NeedsImprovement,
    Poor,
}

/// A single performance metric with its rating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub value: f64,
    pub rating: MetricRating,
}

/// Core Web Vitals and navigation-timing metrics for one page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lcp: Option<MetricValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cls: Option<MetricValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inp: Option<MetricValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tbt: Option<MetricValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcp: Option<MetricValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttfb: Option<MetricValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dom_content_loaded: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_time: Option<f64>,
}

/// One broken link found by the link-health sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenLink {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Link-health sweep summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenLinks {
    pub total_checked: usize,
    pub broken: Vec<BrokenLink>,
}

/// One heading collected in document order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heading {
    /// Heading level 1-6
    pub level: u8,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

/// Issue kinds the heading-structure extractor reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeadingIssueKind {
    MissingH1,
    MultipleH1,
    SkippedLevel,
    EmptyHeading,
    FirstNotH1,
    DuplicateHeadings,
    GenericHeading,
    VeryLong,
    VeryShort,
}

/// One heading-structure issue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingIssue {
    #[serde(rename = "type")]
    pub kind: HeadingIssueKind,
    pub message: String,
    /// Affected heading texts, where the issue concerns a group
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected: Vec<String>,
}

/// Heading outline plus detected issues
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingStructure {
    pub headings: Vec<Heading>,
    pub issues: Vec<HeadingIssue>,
}

/// Rendered page dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDimensions {
    pub width: f64,
    pub height: f64,
}

/// Complete audit report for a single URL
///
/// Immutable once returned by the orchestrator; the crawler composes
/// reports into a summary without mutating them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    /// Overall accessibility score, 0-100
    pub score: u8,
    pub meta: EngineMeta,
    pub violations: SeverityBuckets,
    pub stats: Stats,
    pub human_readable: HumanReadable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard_navigation: Option<KeyboardReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_structure: Option<HeadingStructure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broken_links: Option<BrokenLinks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_dimensions: Option<PageDimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_hash: Option<String>,
    /// Full-page screenshot path, captured only when enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

impl AuditReport {
    /// Recompute `stats` and `score` from the current buckets
    pub fn recompute(&mut self) {
        self.stats = Stats {
            total_violations: self.violations.total_count(),
            critical_count: self.violations.critical_count(),
        };
        self.score = super::score::calculate_score(&self.violations);
    }
}

/// Averaged Core Web Vitals across crawled pages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub lcp: Option<f64>,
    pub cls: Option<f64>,
    pub inp: Option<f64>,
    pub tbt: Option<f64>,
}

impl PerformanceSummary {
    pub fn is_empty(&self) -> bool {
        self.lcp.is_none() && self.cls.is_none() && self.inp.is_none() && self.tbt.is_none()
    }
}

/// Aggregated result of a bounded site crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSummary {
    pub root_url: String,
    pub total_pages_scanned: usize,
    pub average_score: u8,
    pub total_critical_violations: usize,
    pub total_violations: usize,
    pub pages: Vec<AuditReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_summary: Option<PerformanceSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(html: &str) -> ViolationNode {
        ViolationNode {
            html: html.to_string(),
            target: vec!["img".to_string()],
            failure_summary: None,
            selector: None,
            element_label: None,
            component: None,
            bounding_box: None,
            impact: None,
        }
    }

    #[test]
    fn test_violation_count_matches_nodes() {
        let v = Violation::new(
            "image-alt",
            "Images must have alternate text",
            "Ensures <img> elements have alternate text",
            Severity::Critical,
            "https://dequeuniversity.com/rules/axe/4.10/image-alt",
            vec![node("<img src=a.png>"), node("<img src=b.png>")],
        );
        assert_eq!(v.count, 2);
        assert_eq!(v.count, v.nodes.len());
    }

    #[test]
    fn test_buckets_partition_and_totals() {
        let mut buckets = SeverityBuckets::default();
        buckets.push(Violation::new(
            "image-alt",
            "t",
            "d",
            Severity::Critical,
            "h",
            vec![node("<img>"), node("<img>")],
        ));
        buckets.push(Violation::new(
            "link-name",
            "t",
            "d",
            Severity::Serious,
            "h",
            vec![node("<a>")],
        ));

        assert_eq!(buckets.critical.len(), 1);
        assert_eq!(buckets.serious.len(), 1);
        assert_eq!(buckets.total_count(), 3);
        assert_eq!(buckets.critical_count(), 2);
    }

    #[test]
    fn test_severity_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&Severity::Critical).unwrap(),
            "\"critical\""
        );
        let parsed: Severity = serde_json::from_str("\"serious\"").unwrap();
        assert_eq!(parsed, Severity::Serious);
    }

    #[test]
    fn test_severity_parse_lenient_defaults_to_moderate() {
        assert_eq!(Severity::parse_lenient("bogus"), Severity::Moderate);
        assert_eq!(Severity::parse_lenient("critical"), Severity::Critical);
    }

    #[test]
    fn test_act_rule_ref_url() {
        let act = ActRuleRef::new("23a2a8");
        assert!(act.url.ends_with("/act/rules/23a2a8/"));
    }

    #[test]
    fn test_keyboard_issue_kind_serde() {
        let kind = KeyboardIssueKind::NoFocusableElements;
        assert_eq!(
            serde_json::to_string(&kind).unwrap(),
            "\"no-focusable-elements\""
        );
    }

    #[test]
    fn test_heading_issue_kind_serde() {
        assert_eq!(
            serde_json::to_string(&HeadingIssueKind::MissingH1).unwrap(),
            "\"missing-h1\""
        );
        assert_eq!(
            serde_json::to_string(&HeadingIssueKind::SkippedLevel).unwrap(),
            "\"skipped-level\""
        );
    }
}
