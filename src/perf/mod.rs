//! Performance collector
//!
//! Installs Core Web Vitals observers before navigation via a window-scoped
//! metrics object, reads them once after load, and classifies each metric
//! against the authoritative thresholds.

use chromiumoxide::Page;
use tracing::{debug, info};

use crate::browser::eval_json;
use crate::error::Result;
use crate::report::{MetricRating, MetricValue, PerformanceReport};

/// Classification thresholds: (good, poor) per metric
pub mod thresholds {
    pub const LCP: (f64, f64) = (2500.0, 4000.0);
    pub const CLS: (f64, f64) = (0.1, 0.25);
    pub const INP: (f64, f64) = (200.0, 500.0);
    pub const TBT: (f64, f64) = (200.0, 600.0);
    pub const FCP: (f64, f64) = (1800.0, 3000.0);
    pub const TTFB: (f64, f64) = (800.0, 1800.0);
}

/// Installed on every new document before any page script runs. The
/// metrics object is a per-page memo, written by observers and read
/// exactly once after load.
pub const OBSERVER_SCRIPT: &str = r#"
(() => {
    const m = { lcp: null, cls: 0, inp: null, longTasks: [] };
    window.__psMetrics = m;
    try {
        new PerformanceObserver(list => {
            const entries = list.getEntries();
            if (entries.length) {
                const last = entries[entries.length - 1];
                m.lcp = last.renderTime || last.loadTime;
            }
        }).observe({ type: 'largest-contentful-paint', buffered: true });
    } catch (e) {}
    try {
        new PerformanceObserver(list => {
            for (const entry of list.getEntries()) {
                if (!entry.hadRecentInput) m.cls += entry.value;
            }
        }).observe({ type: 'layout-shift', buffered: true });
    } catch (e) {}
    try {
        new PerformanceObserver(list => {
            for (const entry of list.getEntries()) {
                m.inp = entry.duration;
            }
        }).observe({ type: 'event', buffered: true, durationThreshold: 40 });
    } catch (e) {}
    try {
        new PerformanceObserver(list => {
            for (const entry of list.getEntries()) {
                m.longTasks.push({ start: entry.startTime, duration: entry.duration });
            }
        }).observe({ type: 'longtask', buffered: true });
    } catch (e) {}
})();
"#;

const READ_SCRIPT: &str = r#"
(() => {
    const m = window.__psMetrics || { lcp: null, cls: 0, inp: null, longTasks: [] };
    const result = { lcp: m.lcp, cls: m.cls, inp: m.inp };

    const nav = performance.getEntriesByType('navigation')[0];
    if (nav) {
        result.ttfb = nav.responseStart;
        result.domContentLoaded = nav.domContentLoadedEventEnd - nav.startTime;
        result.loadTime = nav.loadEventEnd - nav.startTime;
    }

    let fcp = null;
    for (const paint of performance.getEntriesByType('paint')) {
        if (paint.name === 'first-contentful-paint') fcp = paint.startTime;
    }
    result.fcp = fcp;

    // TBT: blocking portion of long tasks after first contentful paint
    let tbt = 0;
    for (const task of m.longTasks) {
        if (fcp === null || task.start > fcp) {
            tbt += Math.max(0, task.duration - 50);
        }
    }
    result.tbt = tbt;

    return JSON.stringify(result);
})()
"#;

/// Classify a metric value against the fixed thresholds
pub fn classify_metric(name: &str, value: f64) -> MetricRating {
    let (good, poor) = match name {
        "lcp" => thresholds::LCP,
        "cls" => thresholds::CLS,
        "inp" => thresholds::INP,
        "tbt" => thresholds::TBT,
        "fcp" => thresholds::FCP,
        "ttfb" => thresholds::TTFB,
        _ => return MetricRating::Good,
    };
    if value <= good {
        MetricRating::Good
    } else if value <= poor {
        MetricRating::NeedsImprovement
    } else {
        MetricRating::Poor
    }
}

fn rated(name: &str, value: Option<f64>) -> Option<MetricValue> {
    value.map(|v| MetricValue {
        value: v,
        rating: classify_metric(name, v),
    })
}

/// Read the Core Web Vitals recorded by the pre-navigation observers
/// plus the navigation-timing metrics.
pub async fn collect(page: &Page) -> Result<PerformanceReport> {
    debug!("Reading performance metrics...");
    let raw = eval_json(page, READ_SCRIPT).await?;

    let report = PerformanceReport {
        lcp: rated("lcp", raw["lcp"].as_f64()),
        cls: rated("cls", raw["cls"].as_f64()),
        inp: rated("inp", raw["inp"].as_f64()),
        tbt: rated("tbt", raw["tbt"].as_f64()),
        fcp: rated("fcp", raw["fcp"].as_f64()),
        ttfb: rated("ttfb", raw["ttfb"].as_f64()),
        dom_content_loaded: raw["domContentLoaded"].as_f64(),
        load_time: raw["loadTime"].as_f64(),
    };

    info!(
        "Web vitals: LCP={:?}ms CLS={:?} INP={:?}ms TBT={:?}ms",
        report.lcp.map(|m| m.value as i64),
        report.cls.map(|m| m.value),
        report.inp.map(|m| m.value as i64),
        report.tbt.map(|m| m.value as i64),
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_lcp() {
        assert_eq!(classify_metric("lcp", 2000.0), MetricRating::Good);
        assert_eq!(classify_metric("lcp", 2500.0), MetricRating::Good);
        assert_eq!(classify_metric("lcp", 3000.0), MetricRating::NeedsImprovement);
        assert_eq!(classify_metric("lcp", 4001.0), MetricRating::Poor);
    }

    #[test]
    fn test_classify_cls() {
        assert_eq!(classify_metric("cls", 0.05), MetricRating::Good);
        assert_eq!(classify_metric("cls", 0.2), MetricRating::NeedsImprovement);
        assert_eq!(classify_metric("cls", 0.3), MetricRating::Poor);
    }

    #[test]
    fn test_classify_ttfb_and_tbt() {
        assert_eq!(classify_metric("ttfb", 700.0), MetricRating::Good);
        assert_eq!(classify_metric("ttfb", 1900.0), MetricRating::Poor);
        assert_eq!(classify_metric("tbt", 550.0), MetricRating::NeedsImprovement);
    }

    #[test]
    fn test_unknown_metric_defaults_good() {
        assert_eq!(classify_metric("speed-index", 9000.0), MetricRating::Good);
    }

    #[test]
    fn test_observer_script_installs_global() {
        assert!(OBSERVER_SCRIPT.contains("window.__psMetrics"));
        assert!(OBSERVER_SCRIPT.contains("largest-contentful-paint"));
        assert!(OBSERVER_SCRIPT.contains("hadRecentInput"));
        assert!(OBSERVER_SCRIPT.contains("longtask"));
    }
}
