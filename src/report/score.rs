//! Scoring and priority math
//!
//! The score starts at 100 and loses `weight(impact) × nodeCount` per
//! violation; priority ranking dampens occurrences with a square root.
//! Both formulas are deliberately kept separate.

use super::types::{Severity, SeverityBuckets, WcagLevel};

/// Calculate the 0-100 accessibility score from the severity buckets
///
/// Deterministic in the violation multiset: identical buckets always
/// produce the identical score.
pub fn calculate_score(buckets: &SeverityBuckets) -> u8 {
    let mut score = 100.0_f64;
    for violation in buckets.iter() {
        score -= violation.severity.score_weight() * violation.count as f64;
    }
    score.clamp(0.0, 100.0).round() as u8
}

/// Priority score used to order action items
///
/// `impactWeight × wcagWeight × max(1, sqrt(occurrences))`; unknown WCAG
/// levels weigh 1.
pub fn priority_score(severity: Severity, level: Option<WcagLevel>, occurrences: usize) -> f64 {
    let impact_weight = severity.priority_weight();
    let wcag_weight = level.map(|l| l.priority_weight()).unwrap_or(1.0);
    impact_weight * wcag_weight * (occurrences as f64).sqrt().max(1.0)
}

/// Map a priority score onto a coarse label for downstream display
pub fn priority_label(score: f64) -> &'static str {
    if score >= 9.0 {
        "high"
    } else if score >= 4.0 {
        "medium"
    } else {
        "low"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::types::{Violation, ViolationNode};

    fn nodes(n: usize) -> Vec<ViolationNode> {
        (0..n)
            .map(|i| ViolationNode {
                html: format!("<img src=\"{}.png\">", i),
                target: vec![format!("img:nth-of-type({})", i + 1)],
                failure_summary: None,
                selector: None,
                element_label: None,
                component: None,
                bounding_box: None,
                impact: None,
            })
            .collect()
    }

    fn bucket_with(severity: Severity, node_count: usize) -> SeverityBuckets {
        let mut buckets = SeverityBuckets::default();
        buckets.push(Violation::new("r", "t", "d", severity, "h", nodes(node_count)));
        buckets
    }

    #[test]
    fn test_empty_buckets_score_100() {
        assert_eq!(calculate_score(&SeverityBuckets::default()), 100);
    }

    #[test]
    fn test_one_critical_node_scores_95() {
        assert_eq!(calculate_score(&bucket_with(Severity::Critical, 1)), 95);
    }

    #[test]
    fn test_twenty_critical_nodes_clamp_to_zero() {
        // 5 × 20 = 100 deducted
        assert_eq!(calculate_score(&bucket_with(Severity::Critical, 20)), 0);
    }

    #[test]
    fn test_minor_weight_rounds() {
        // 3 minor nodes: 100 - 1.5 = 98.5, rounds to 99
        assert_eq!(calculate_score(&bucket_with(Severity::Minor, 3)), 99);
    }

    #[test]
    fn test_mixed_buckets() {
        let mut buckets = SeverityBuckets::default();
        buckets.push(Violation::new("a", "t", "d", Severity::Serious, "h", nodes(2)));
        buckets.push(Violation::new("b", "t", "d", Severity::Moderate, "h", nodes(4)));
        // 100 - 6 - 4 = 90
        assert_eq!(calculate_score(&buckets), 90);
    }

    #[test]
    fn test_score_is_pure() {
        let buckets = bucket_with(Severity::Serious, 3);
        assert_eq!(calculate_score(&buckets), calculate_score(&buckets));
    }

    #[test]
    fn test_priority_single_occurrence() {
        // 4 × 3 × max(1, 1) = 12
        let p = priority_score(Severity::Critical, Some(WcagLevel::A), 1);
        assert_eq!(p, 12.0);
    }

    #[test]
    fn test_priority_sqrt_dampening() {
        // 3 × 2 × sqrt(9) = 18
        let p = priority_score(Severity::Serious, Some(WcagLevel::AA), 9);
        assert!((p - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_priority_unknown_level_weighs_one() {
        let p = priority_score(Severity::Moderate, None, 1);
        assert_eq!(p, 2.0);
    }

    #[test]
    fn test_priority_labels() {
        assert_eq!(priority_label(12.0), "high");
        assert_eq!(priority_label(6.0), "medium");
        assert_eq!(priority_label(2.0), "low");
    }
}
