//! Crawler
//!
//! Sitemap-preferred, BFS-fallback discovery with a bounded page budget.
//! One browser is shared across pages; every page handle is closed before
//! the next opens, and the browser is torn down on every exit path of
//! `crawl_site`.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, info, warn};
use url::Url;

use crate::browser::SessionOptions;
use crate::error::{Result, ScanError};
use crate::report::{AuditReport, CrawlSummary, PerformanceSummary};
use crate::scan::{validate_scan_url, ScanOptions, Scanner};

/// URLs whose paths match these keywords are scanned first
const PRIORITY_KEYWORDS: &[&str] = &[
    "contact", "about", "pricing", "services", "products",
    "kontakt", "o-nas", "onas", "cenik", "ceník", "sluzby", "služby", "produkty",
];

/// Crawl configuration
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Hard cap on scanned pages
    pub max_pages: usize,
    /// Per-page scan options
    pub scan: ScanOptions,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_pages: 10,
            scan: ScanOptions::default(),
        }
    }
}

/// Visited-set key: the URL with any trailing slash removed
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.is_empty() {
        url.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Lenient `<loc>` extraction; malformed XML is admitted on purpose
pub fn extract_locs(content: &str) -> Vec<String> {
    let mut urls = Vec::new();
    let mut rest = content;
    while let Some(start) = rest.find("<loc>") {
        rest = &rest[start + 5..];
        let Some(end) = rest.find("</loc>") else {
            break;
        };
        let loc = rest[..end].trim();
        if !loc.is_empty() {
            urls.push(loc.to_string());
        }
        rest = &rest[end + 6..];
    }
    urls
}

fn keyword_rank(url: &str) -> usize {
    let lowered = url.to_lowercase();
    PRIORITY_KEYWORDS
        .iter()
        .position(|kw| lowered.contains(kw))
        .unwrap_or(usize::MAX)
}

/// Keep same-host URLs and order them by keyword priority, preserving
/// sitemap order within equal ranks.
pub fn prioritize(urls: Vec<String>, root: &Url) -> Vec<String> {
    let mut kept: Vec<String> = urls
        .into_iter()
        .filter(|u| {
            Url::parse(u)
                .map(|parsed| parsed.host_str() == root.host_str())
                .unwrap_or(false)
        })
        .collect();
    kept.sort_by_key(|u| keyword_rank(u));
    kept
}

async fn fetch_text(url: &str) -> Result<String> {
    let response = reqwest::get(url).await?;
    if !response.status().is_success() {
        return Err(ScanError::Output {
            reason: format!("{} returned {}", url, response.status()),
        });
    }
    Ok(response.text().await?)
}

/// Discover start URLs: `/sitemap.xml` first, the root alone as fallback
pub async fn discover(root: &Url) -> Vec<String> {
    let sitemap_url = match root.join("/sitemap.xml") {
        Ok(url) => url.to_string(),
        Err(_) => return vec![root.to_string()],
    };
    let content = match fetch_text(&sitemap_url).await {
        Ok(content) => content,
        Err(e) => {
            debug!("No sitemap at {}: {}", sitemap_url, e);
            return vec![root.to_string()];
        }
    };

    let mut urls = Vec::new();
    if content.contains("<sitemapindex") {
        info!("Sitemap index detected, following one level");
        for nested in extract_locs(&content) {
            match fetch_text(&nested).await {
                Ok(nested_content) => urls.extend(extract_locs(&nested_content)),
                Err(e) => warn!("Nested sitemap {} failed: {}", nested, e),
            }
        }
    } else {
        urls = extract_locs(&content);
    }

    let prioritized = prioritize(urls, root);
    if prioritized.is_empty() {
        vec![root.to_string()]
    } else {
        info!("Sitemap yielded {} same-host URLs", prioritized.len());
        prioritized
    }
}

/// Average the Core Web Vitals over pages that reported each metric
pub fn summarize_performance(pages: &[AuditReport]) -> Option<PerformanceSummary> {
    fn average(values: Vec<f64>) -> Option<f64> {
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    let perf: Vec<_> = pages.iter().filter_map(|p| p.performance.as_ref()).collect();
    let summary = PerformanceSummary {
        lcp: average(perf.iter().filter_map(|p| p.lcp.map(|m| m.value)).collect()),
        cls: average(perf.iter().filter_map(|p| p.cls.map(|m| m.value)).collect()),
        inp: average(perf.iter().filter_map(|p| p.inp.map(|m| m.value)).collect()),
        tbt: average(perf.iter().filter_map(|p| p.tbt.map(|m| m.value)).collect()),
    };
    if summary.is_empty() {
        None
    } else {
        Some(summary)
    }
}

/// Fold per-page reports into the crawl summary
pub fn aggregate(root_url: &str, pages: Vec<AuditReport>) -> CrawlSummary {
    let total_pages_scanned = pages.len();
    let average_score = if total_pages_scanned == 0 {
        0
    } else {
        let sum: u32 = pages.iter().map(|p| p.score as u32).sum();
        (sum as f64 / total_pages_scanned as f64).round() as u8
    };
    let total_critical_violations = pages.iter().map(|p| p.stats.critical_count).sum();
    let total_violations = pages.iter().map(|p| p.stats.total_violations).sum();
    let performance_summary = summarize_performance(&pages);

    CrawlSummary {
        root_url: root_url.to_string(),
        total_pages_scanned,
        average_score,
        total_critical_violations,
        total_violations,
        pages,
        performance_summary,
    }
}

/// Crawl with a borrowed scanner; the caller owns browser teardown
pub async fn crawl(scanner: &Scanner, root: &str, options: &CrawlOptions) -> Result<CrawlSummary> {
    let root_url = validate_scan_url(root)?;
    info!("Crawling {} (max {} pages)", root_url, options.max_pages);

    let mut queue: VecDeque<String> = discover(&root_url).await.into();
    let mut visited: HashSet<String> = HashSet::new();
    let mut pages: Vec<AuditReport> = Vec::new();

    while let Some(next) = queue.pop_front() {
        if pages.len() >= options.max_pages {
            break;
        }
        let key = normalize_url(&next);
        if !visited.insert(key) {
            continue;
        }

        match scanner.scan_with_links(&next, &options.scan).await {
            Ok((report, discovered)) => {
                // Same-host links surfaced by the scan feed the BFS queue
                for link in discovered {
                    if !visited.contains(&normalize_url(&link)) {
                        queue.push_back(link);
                    }
                }
                pages.push(report);
            }
            Err(e @ (ScanError::Canceled | ScanError::ResourceExhausted { .. })) => {
                return Err(e);
            }
            Err(e) => {
                warn!("Skipping {}: {}", next, e);
            }
        }
    }

    info!("Crawl complete: {} pages scanned", pages.len());
    Ok(aggregate(root_url.as_str(), pages))
}

/// Crawl with a freshly launched browser, torn down on every exit path
pub async fn crawl_site(
    root: &str,
    options: &CrawlOptions,
    session: SessionOptions,
) -> Result<CrawlSummary> {
    let scanner = Scanner::with_options(session).await?;
    let outcome = crawl(&scanner, root, options).await;
    if let Err(e) = scanner.close().await {
        warn!("Browser teardown failed: {}", e);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_trailing_slash() {
        assert_eq!(normalize_url("https://example.com/a/"), "https://example.com/a");
        assert_eq!(normalize_url("https://example.com/a"), "https://example.com/a");
    }

    #[test]
    fn test_extract_locs_multiline() {
        let sitemap = r#"<?xml version="1.0"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>https://example.com/a</loc>
  </url>
  <url>
    <loc> https://example.com/b </loc>
  </url>
</urlset>"#;
        assert_eq!(
            extract_locs(sitemap),
            vec!["https://example.com/a", "https://example.com/b"]
        );
    }

    #[test]
    fn test_extract_locs_minified() {
        let sitemap = "<urlset><url><loc>https://example.com/x</loc></url>\
                       <url><loc>https://example.com/y</loc></url></urlset>";
        assert_eq!(extract_locs(sitemap).len(), 2);
    }

    #[test]
    fn test_extract_locs_tolerates_broken_xml() {
        let sitemap = "<loc>https://example.com/only</loc><loc>unclosed";
        assert_eq!(extract_locs(sitemap), vec!["https://example.com/only"]);
    }

    #[test]
    fn test_prioritize_filters_foreign_hosts() {
        let root = Url::parse("https://example.com/").unwrap();
        let urls = vec![
            "https://example.com/blog".to_string(),
            "https://cdn.example.net/asset".to_string(),
            "https://example.com/contact".to_string(),
        ];
        let ordered = prioritize(urls, &root);
        assert_eq!(
            ordered,
            vec!["https://example.com/contact", "https://example.com/blog"]
        );
    }

    #[test]
    fn test_prioritize_is_stable_within_rank() {
        let root = Url::parse("https://example.com/").unwrap();
        let urls = vec![
            "https://example.com/one".to_string(),
            "https://example.com/two".to_string(),
        ];
        assert_eq!(
            prioritize(urls, &root),
            vec!["https://example.com/one", "https://example.com/two"]
        );
    }

    #[test]
    fn test_prioritize_czech_keywords() {
        let root = Url::parse("https://example.cz/").unwrap();
        let urls = vec![
            "https://example.cz/clanky".to_string(),
            "https://example.cz/kontakt".to_string(),
        ];
        let ordered = prioritize(urls, &root);
        assert_eq!(ordered[0], "https://example.cz/kontakt");
    }

    fn page(score: u8, total: usize, critical: usize) -> AuditReport {
        use crate::report::{EngineMeta, HumanReadable, SeverityBuckets, Stats};
        AuditReport {
            url: "https://example.com/".to_string(),
            timestamp: chrono::Utc::now(),
            score,
            meta: EngineMeta::default(),
            violations: SeverityBuckets::default(),
            stats: Stats {
                total_violations: total,
                critical_count: critical,
            },
            human_readable: HumanReadable::default(),
            performance: None,
            keyboard_navigation: None,
            heading_structure: None,
            broken_links: None,
            page_dimensions: None,
            domain_hash: None,
            screenshot: None,
        }
    }

    #[test]
    fn test_aggregate_totals() {
        let summary = aggregate(
            "https://example.com/",
            vec![page(90, 4, 1), page(70, 6, 2)],
        );
        assert_eq!(summary.total_pages_scanned, 2);
        assert_eq!(summary.average_score, 80);
        assert_eq!(summary.total_violations, 10);
        assert_eq!(summary.total_critical_violations, 3);
        assert!(summary.performance_summary.is_none());
    }

    #[test]
    fn test_aggregate_rounds_average() {
        let summary = aggregate(
            "https://example.com/",
            vec![page(90, 0, 0), page(85, 0, 0)],
        );
        // 87.5 rounds to 88
        assert_eq!(summary.average_score, 88);
    }

    #[test]
    fn test_performance_summary_averages_contributing_pages() {
        use crate::report::{MetricRating, MetricValue, PerformanceReport};
        let mut a = page(100, 0, 0);
        a.performance = Some(PerformanceReport {
            lcp: Some(MetricValue {
                value: 2000.0,
                rating: MetricRating::Good,
            }),
            ..Default::default()
        });
        let mut b = page(100, 0, 0);
        b.performance = Some(PerformanceReport {
            lcp: Some(MetricValue {
                value: 4000.0,
                rating: MetricRating::Poor,
            }),
            cls: Some(MetricValue {
                value: 0.2,
                rating: MetricRating::NeedsImprovement,
            }),
            ..Default::default()
        });

        let summary = summarize_performance(&[a, b]).unwrap();
        assert_eq!(summary.lcp, Some(3000.0));
        assert_eq!(summary.cls, Some(0.2));
        assert_eq!(summary.inp, None);
    }
}
