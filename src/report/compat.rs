//! Lenient reports-from-JSON loader
//!
//! The only contract the core exposes to downstream renderers: any file
//! matching the `AuditReport` or `CrawlSummary` schema must load without
//! error. Accepts the documented legacy shapes: violations as a flat array
//! or partitioned by severity, performance metrics flat or nested, heading
//! levels numeric or `"H1"`-style.

use serde_json::{json, Map, Value};

use super::types::{AuditReport, CrawlSummary};
use crate::error::{Result, ScanError};
use crate::perf::classify_metric;

/// A loaded report file, either a single page or a crawl
#[derive(Debug, Clone)]
pub enum ReportDocument {
    Single(Box<AuditReport>),
    Crawl(Box<CrawlSummary>),
}

/// Load a report document from parsed JSON, normalizing legacy shapes
pub fn from_json_value(value: Value) -> Result<ReportDocument> {
    let mut value = value;
    if value.get("pages").is_some() {
        if let Some(pages) = value.get_mut("pages").and_then(Value::as_array_mut) {
            for page in pages.iter_mut() {
                normalize_report(page);
            }
        }
        let summary: CrawlSummary = serde_json::from_value(value)?;
        Ok(ReportDocument::Crawl(Box::new(summary)))
    } else if value.get("url").is_some() {
        normalize_report(&mut value);
        let report: AuditReport = serde_json::from_value(value)?;
        Ok(ReportDocument::Single(Box::new(report)))
    } else {
        Err(ScanError::Output {
            reason: "JSON is neither an AuditReport nor a CrawlSummary".to_string(),
        })
    }
}

fn normalize_report(value: &mut Value) {
    normalize_violations(value);
    normalize_performance(value);
    normalize_headings(value);
}

/// Accept a flat `violations: [...]` array by partitioning on each entry's
/// severity; recompute per-violation counts when absent.
fn normalize_violations(value: &mut Value) {
    let Some(obj) = value.as_object_mut() else {
        return;
    };

    let violations = match obj.get_mut("violations") {
        Some(v) => v,
        None => return,
    };

    if let Some(flat) = violations.as_array().cloned() {
        let mut buckets = Map::new();
        for key in ["critical", "serious", "moderate", "minor"] {
            buckets.insert(key.to_string(), Value::Array(Vec::new()));
        }
        for mut violation in flat {
            fill_count(&mut violation);
            let severity = violation
                .get("severity")
                .and_then(Value::as_str)
                .unwrap_or("moderate")
                .to_string();
            let key = match severity.as_str() {
                "critical" | "serious" | "minor" => severity,
                _ => "moderate".to_string(),
            };
            if let Some(Value::Array(bucket)) = buckets.get_mut(&key) {
                bucket.push(violation);
            }
        }
        *violations = Value::Object(buckets);
    } else if let Some(bucketed) = violations.as_object_mut() {
        for bucket in bucketed.values_mut() {
            if let Some(list) = bucket.as_array_mut() {
                for violation in list.iter_mut() {
                    fill_count(violation);
                }
            }
        }
    }

    // Stats may be absent in legacy files
    if obj.get("stats").is_none() {
        let (total, critical) = count_from_buckets(obj.get("violations"));
        obj.insert(
            "stats".to_string(),
            json!({ "totalViolations": total, "criticalCount": critical }),
        );
    }

    if obj.get("humanReadable").is_none() {
        obj.insert(
            "humanReadable".to_string(),
            json!({ "actionItems": [], "topIssues": [] }),
        );
    }
}

fn fill_count(violation: &mut Value) {
    let Some(obj) = violation.as_object_mut() else {
        return;
    };
    if obj.get("count").is_none() {
        let n = obj
            .get("nodes")
            .and_then(Value::as_array)
            .map(|a| a.len())
            .unwrap_or(0);
        obj.insert("count".to_string(), json!(n));
    }
    if obj.get("nodes").is_none() {
        obj.insert("nodes".to_string(), json!([]));
    }
}

fn count_from_buckets(violations: Option<&Value>) -> (u64, u64) {
    let mut total = 0;
    let mut critical = 0;
    if let Some(buckets) = violations.and_then(Value::as_object) {
        for (key, bucket) in buckets {
            if let Some(list) = bucket.as_array() {
                for violation in list {
                    let count = violation.get("count").and_then(Value::as_u64).unwrap_or(0);
                    total += count;
                    if key == "critical" {
                        critical += count;
                    }
                }
            }
        }
    }
    (total, critical)
}

/// Accept flat numeric metrics (`"lcp": 2300`) by re-rating them against
/// the authoritative thresholds.
fn normalize_performance(value: &mut Value) {
    let Some(perf) = value.get_mut("performance") else {
        return;
    };
    let Some(obj) = perf.as_object_mut() else {
        return;
    };
    for name in ["lcp", "cls", "inp", "tbt", "fcp", "ttfb"] {
        if let Some(v) = obj.get(name).and_then(Value::as_f64) {
            let rating = classify_metric(name, v);
            obj.insert(
                name.to_string(),
                json!({ "value": v, "rating": rating }),
            );
        }
    }
}

/// Accept heading levels written as `"H2"` / `"h2"` strings.
fn normalize_headings(value: &mut Value) {
    let Some(headings) = value
        .get_mut("headingStructure")
        .and_then(|hs| hs.get_mut("headings"))
        .and_then(Value::as_array_mut)
    else {
        return;
    };
    for heading in headings.iter_mut() {
        let Some(obj) = heading.as_object_mut() else {
            continue;
        };
        if let Some(s) = obj.get("level").and_then(Value::as_str) {
            let parsed = s
                .trim_start_matches(['H', 'h'])
                .parse::<u8>()
                .unwrap_or(1);
            obj.insert("level".to_string(), json!(parsed));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_report() -> Value {
        json!({
            "url": "https://example.com/",
            "timestamp": "2026-07-01T12:00:00Z",
            "score": 95,
            "meta": { "browserVersion": "126.0", "engineVersion": "4.10.0" },
            "violations": { "critical": [], "serious": [], "moderate": [], "minor": [] },
            "stats": { "totalViolations": 0, "criticalCount": 0 },
            "humanReadable": { "actionItems": [], "topIssues": [] }
        })
    }

    #[test]
    fn test_loads_canonical_report() {
        let doc = from_json_value(base_report()).unwrap();
        match doc {
            ReportDocument::Single(r) => assert_eq!(r.score, 95),
            _ => panic!("expected single report"),
        }
    }

    #[test]
    fn test_flat_violation_array_is_partitioned() {
        let mut report = base_report();
        report["violations"] = json!([
            {
                "id": "image-alt",
                "title": "Images must have alternate text",
                "description": "d",
                "severity": "critical",
                "helpUrl": "h",
                "nodes": [{ "html": "<img>", "target": ["img"] }]
            },
            {
                "id": "list",
                "title": "t",
                "description": "d",
                "severity": "moderate",
                "helpUrl": "h",
                "nodes": []
            }
        ]);
        report.as_object_mut().unwrap().remove("stats");

        let doc = from_json_value(report).unwrap();
        let ReportDocument::Single(r) = doc else {
            panic!("expected single report");
        };
        assert_eq!(r.violations.critical.len(), 1);
        assert_eq!(r.violations.critical[0].count, 1);
        assert_eq!(r.violations.moderate.len(), 1);
        assert_eq!(r.stats.total_violations, 1);
        assert_eq!(r.stats.critical_count, 1);
    }

    #[test]
    fn test_flat_performance_metrics_are_rated() {
        let mut report = base_report();
        report["performance"] = json!({ "lcp": 2300.0, "cls": 0.3 });

        let ReportDocument::Single(r) = from_json_value(report).unwrap() else {
            panic!("expected single report");
        };
        let perf = r.performance.unwrap();
        assert_eq!(perf.lcp.unwrap().value, 2300.0);
        assert_eq!(
            perf.lcp.unwrap().rating,
            crate::report::MetricRating::Good
        );
        assert_eq!(perf.cls.unwrap().rating, crate::report::MetricRating::Poor);
    }

    #[test]
    fn test_string_heading_levels() {
        let mut report = base_report();
        report["headingStructure"] = json!({
            "headings": [
                { "level": "H1", "text": "Welcome" },
                { "level": "h3", "text": "Details" }
            ],
            "issues": []
        });

        let ReportDocument::Single(r) = from_json_value(report).unwrap() else {
            panic!("expected single report");
        };
        let hs = r.heading_structure.unwrap();
        assert_eq!(hs.headings[0].level, 1);
        assert_eq!(hs.headings[1].level, 3);
    }

    #[test]
    fn test_crawl_summary_detection() {
        let summary = json!({
            "rootUrl": "https://example.com/",
            "totalPagesScanned": 1,
            "averageScore": 100,
            "totalCriticalViolations": 0,
            "totalViolations": 0,
            "pages": [base_report()]
        });
        let doc = from_json_value(summary).unwrap();
        assert!(matches!(doc, ReportDocument::Crawl(_)));
    }

    #[test]
    fn test_rejects_unrecognized_document() {
        assert!(from_json_value(json!({ "hello": 1 })).is_err());
    }
}
