//! Report data model and violation normalization
//!
//! Defines the `AuditReport`/`CrawlSummary` contract consumed by downstream
//! renderers, the scoring and priority math, the central rule-guidance table,
//! and the normalization layer that folds rules-engine output and custom
//! probe findings into one taxonomy.

mod compat;
mod guidance;
mod normalize;
mod score;
mod types;

pub use compat::{from_json_value, ReportDocument};
pub use guidance::{guidance_for, RuleGuidance};
pub use normalize::{
    action_item_for, derive_element_label, derive_friendly_selector, fingerprint,
    map_engine_result, merge_findings, ProbeFindings,
};
pub use score::{calculate_score, priority_label, priority_score};
pub use types::{
    ActRuleRef, ActionItem, AuditReport, BoundingBox, BrokenLink, BrokenLinks, CrawlSummary,
    EngineMeta, Heading, HeadingIssue, HeadingIssueKind, HeadingStructure, HumanReadable,
    KeyboardIssue, KeyboardIssueKind, KeyboardReport, MetricRating, MetricValue, PageDimensions,
    PerformanceReport, PerformanceSummary, Severity, SeverityBuckets, Stats, Violation,
    ViolationNode, WcagLevel,
};
