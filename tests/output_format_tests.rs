//! Output format integration tests
//!
//! The lenient loader must accept every documented report shape: current
//! files, flat violation arrays, flat performance numbers, and string
//! heading levels.

use serde_json::json;

use pagesentry::output::{load_report_file, write_report_file};
use pagesentry::report::{HeadingIssueKind, MetricRating, ReportDocument, Severity};

fn canonical_report() -> serde_json::Value {
    json!({
        "url": "https://example.com/",
        "timestamp": "2026-07-01T12:00:00Z",
        "score": 88,
        "meta": { "browserVersion": "HeadlessChrome/126.0", "engineVersion": "4.10.2" },
        "violations": {
            "critical": [],
            "serious": [{
                "id": "link-name",
                "title": "Links must have discernible text",
                "description": "Ensures links have discernible text",
                "severity": "serious",
                "helpUrl": "https://dequeuniversity.com/rules/axe/4.10/link-name",
                "count": 1,
                "nodes": [{ "html": "<a href=\"/x\"></a>", "target": ["a"] }]
            }],
            "moderate": [],
            "minor": []
        },
        "stats": { "totalViolations": 1, "criticalCount": 0 },
        "humanReadable": { "actionItems": [], "topIssues": [] }
    })
}

fn load(value: serde_json::Value) -> ReportDocument {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    std::fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    load_report_file(&path).unwrap()
}

#[test]
fn test_canonical_report_loads() {
    let ReportDocument::Single(report) = load(canonical_report()) else {
        panic!("expected a single report");
    };
    assert_eq!(report.score, 88);
    assert_eq!(report.violations.serious.len(), 1);
    assert_eq!(report.violations.serious[0].severity, Severity::Serious);
}

#[test]
fn test_flat_violations_accepted() {
    let mut value = canonical_report();
    value["violations"] = json!([
        {
            "id": "image-alt",
            "title": "Images must have alternate text",
            "description": "d",
            "severity": "critical",
            "helpUrl": "h",
            "nodes": [
                { "html": "<img>", "target": ["img"] },
                { "html": "<img>", "target": ["img:nth-of-type(2)"] }
            ]
        }
    ]);
    value.as_object_mut().unwrap().remove("stats");

    let ReportDocument::Single(report) = load(value) else {
        panic!("expected a single report");
    };
    assert_eq!(report.violations.critical.len(), 1);
    assert_eq!(report.violations.critical[0].count, 2);
    assert_eq!(report.stats.total_violations, 2);
    assert_eq!(report.stats.critical_count, 2);
}

#[test]
fn test_flat_performance_accepted() {
    let mut value = canonical_report();
    value["performance"] = json!({ "lcp": 3200.0, "fcp": 900.0, "ttfb": 2200.0 });

    let ReportDocument::Single(report) = load(value) else {
        panic!("expected a single report");
    };
    let perf = report.performance.unwrap();
    assert_eq!(perf.lcp.unwrap().rating, MetricRating::NeedsImprovement);
    assert_eq!(perf.fcp.unwrap().rating, MetricRating::Good);
    assert_eq!(perf.ttfb.unwrap().rating, MetricRating::Poor);
}

#[test]
fn test_nested_performance_accepted() {
    let mut value = canonical_report();
    value["performance"] = json!({
        "lcp": { "value": 2000.0, "rating": "good" },
        "cls": { "value": 0.05, "rating": "good" }
    });

    let ReportDocument::Single(report) = load(value) else {
        panic!("expected a single report");
    };
    let perf = report.performance.unwrap();
    assert_eq!(perf.lcp.unwrap().value, 2000.0);
    assert_eq!(perf.cls.unwrap().rating, MetricRating::Good);
}

#[test]
fn test_string_heading_levels_accepted() {
    let mut value = canonical_report();
    value["headingStructure"] = json!({
        "headings": [
            { "level": "H1", "text": "Welcome" },
            { "level": "H2", "text": "News" },
            { "level": 3, "text": "Today" }
        ],
        "issues": [
            { "type": "missing-h1", "message": "m" }
        ]
    });

    let ReportDocument::Single(report) = load(value) else {
        panic!("expected a single report");
    };
    let structure = report.heading_structure.unwrap();
    assert_eq!(structure.headings[0].level, 1);
    assert_eq!(structure.headings[1].level, 2);
    assert_eq!(structure.headings[2].level, 3);
    assert_eq!(structure.issues[0].kind, HeadingIssueKind::MissingH1);
}

#[test]
fn test_written_files_reload() {
    let ReportDocument::Single(report) = load(canonical_report()) else {
        panic!("expected a single report");
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rewritten.json");
    write_report_file(&*report, &path).unwrap();

    let ReportDocument::Single(reloaded) = load_report_file(&path).unwrap() else {
        panic!("expected a single report");
    };
    assert_eq!(reloaded.url, report.url);
    assert_eq!(reloaded.stats, report.stats);
}

#[test]
fn test_crawl_summary_with_legacy_pages() {
    let mut page = canonical_report();
    page["performance"] = json!({ "lcp": 1000.0 });
    let summary = json!({
        "rootUrl": "https://example.com/",
        "totalPagesScanned": 1,
        "averageScore": 88,
        "totalCriticalViolations": 0,
        "totalViolations": 1,
        "pages": [page]
    });

    let ReportDocument::Crawl(crawl) = load(summary) else {
        panic!("expected a crawl summary");
    };
    assert_eq!(crawl.total_pages_scanned, 1);
    assert!(crawl.pages[0].performance.is_some());
}
