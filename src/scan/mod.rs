//! Scan orchestrator
//!
//! Drives one page through the instrumentation, interaction and probing
//! phases in strict order and assembles the `AuditReport`. Only input
//! validation, navigation, the engine pass and browser loss are fatal;
//! every other phase degrades to an absent optional field.

mod dynamic;

use std::future::Future;

use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::browser::{dismiss_cookie_banners, eval_json, BrowserSession, DeviceProfile, SessionOptions};
use crate::error::{Result, ScanError};
use crate::report::{merge_findings, AuditReport, BoundingBox, PageDimensions};
use crate::{engine, headings, keyboard, links, perf, probes, report};

/// Wire format of a scan request as submitted by external callers
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub url: String,
    #[serde(default)]
    pub mode: ScanMode,
    #[serde(default)]
    pub max_pages: Option<usize>,
    #[serde(default)]
    pub device: Option<String>,
}

impl ScanRequest {
    /// Resolve the requested device profile, defaulting to desktop
    pub fn device_profile(&self) -> DeviceProfile {
        self.device
            .as_deref()
            .and_then(DeviceProfile::parse)
            .unwrap_or_default()
    }
}

/// Requested scan mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    #[default]
    Single,
    Crawl,
}

/// Per-scan options
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Device profile to emulate
    pub device: DeviceProfile,
    /// Skip heavyweight outputs (screenshots, per-node bounding boxes)
    pub skip_heavy: bool,
    /// Cancellation signal; interrupts navigation, waits, and the link sweep
    pub cancel: CancellationToken,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            device: DeviceProfile::default(),
            skip_heavy: false,
            cancel: CancellationToken::new(),
        }
    }
}

/// Validate a scan target up front
///
/// Absolute HTTP(S) URLs only; non-HTML extensions are rejected with a
/// distinguishable, non-fatal `InvalidInput`.
pub fn validate_scan_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| ScanError::invalid_input(raw, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScanError::invalid_input(
            raw,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ScanError::invalid_input(raw, "missing host"));
    }
    if links::has_non_html_extension(&url) {
        return Err(ScanError::invalid_input(raw, "non-HTML extension"));
    }
    Ok(url)
}

/// First 16 hex chars of the SHA-256 of the host
pub fn domain_hash(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let digest = Sha256::digest(host.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    Some(hex[..16].to_string())
}

/// Localized one-line conformance summary for the human-readable block
pub fn statement_text(lang: &str, score: u8, total_violations: usize) -> String {
    if lang.starts_with("cs") {
        format!(
            "Automatická kontrola nalezla {} problémů s přístupností; skóre stránky je {}/100.",
            total_violations, score
        )
    } else {
        format!(
            "Automated checks found {} accessibility issues; the page scores {}/100.",
            total_violations, score
        )
    }
}

async fn with_cancel<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = T>,
) -> Result<T> {
    tokio::select! {
        _ = cancel.cancelled() => Err(ScanError::Canceled),
        value = fut => Ok(value),
    }
}

/// Scanner - owns one browser for its whole lifetime
///
/// Exactly one page is open at a time; every scan closes its page on all
/// exit paths. `close()` tears the browser down.
pub struct Scanner {
    session: BrowserSession,
}

impl Scanner {
    /// Launch a scanner with default browser options
    pub async fn new() -> Result<Self> {
        Ok(Self {
            session: BrowserSession::launch().await?,
        })
    }

    /// Launch a scanner with explicit browser options
    pub async fn with_options(options: SessionOptions) -> Result<Self> {
        Ok(Self {
            session: BrowserSession::launch_with(options).await?,
        })
    }

    pub fn session(&self) -> &BrowserSession {
        &self.session
    }

    /// Scan one URL into an `AuditReport`
    pub async fn scan(&self, raw_url: &str, options: &ScanOptions) -> Result<AuditReport> {
        self.scan_with_links(raw_url, options)
            .await
            .map(|(report, _)| report)
    }

    /// Scan one URL, also returning the same-host links the page surfaced
    /// (the crawler feeds these into its BFS queue).
    pub async fn scan_with_links(
        &self,
        raw_url: &str,
        options: &ScanOptions,
    ) -> Result<(AuditReport, Vec<String>)> {
        let url = validate_scan_url(raw_url)?;
        info!("Scanning {} as {}", url, options.device);

        // Phase 1: page + device profile
        let page = self.session.new_page(options.device).await?;

        // Phase 2: observers must be installed before navigation
        let prepared = self
            .session
            .install_on_new_document(&page, perf::OBSERVER_SCRIPT)
            .await;
        if let Err(e) = prepared {
            let _ = page.close().await;
            return Err(e);
        }

        // Phase 3: navigate; everything after runs against the settled page
        if let Err(e) = self.session.navigate(&page, url.as_str(), &options.cancel).await {
            let _ = page.close().await;
            return Err(e);
        }

        let result = self.scan_loaded_page(&page, &url, options).await;
        if let Err(e) = page.close().await {
            warn!("Failed to close page: {}", e);
        }
        result
    }

    async fn scan_loaded_page(
        &self,
        page: &Page,
        url: &Url,
        options: &ScanOptions,
    ) -> Result<(AuditReport, Vec<String>)> {
        let cancel = &options.cancel;

        // Phase 4: cookie banners, selector whitelist then text match
        match with_cancel(cancel, dismiss_cookie_banners(page)).await? {
            Ok(true) => debug!("Cookie banner dismissed"),
            Ok(false) => {}
            Err(e) => warn!("Cookie dismissal failed: {}", e),
        }

        // Phase 5: read the pre-navigation performance memo
        let performance = match with_cancel(cancel, perf::collect(page)).await? {
            Ok(perf) => Some(perf),
            Err(e) => {
                warn!("Performance collection failed: {}", e);
                None
            }
        };

        // Phase 6: surface collapsed UI before analysis
        if let Err(e) = with_cancel(cancel, dynamic::explore(page)).await? {
            warn!("Dynamic exploration failed: {}", e);
        }

        // Phase 7: keyboard walk
        let keyboard_navigation = match with_cancel(cancel, keyboard::walk(page)).await? {
            Ok(walk) => Some(walk),
            Err(e) => {
                warn!("Keyboard walk failed: {}", e);
                None
            }
        };

        // Phase 8: rules engine pass; failure aborts the scan
        let engine_result =
            with_cancel(cancel, engine::analyze(page, self.session.version())).await??;
        let mut audit = report::map_engine_result(url, &engine_result);

        // Phase 9: custom probe suite, then recompute stats on merge
        let findings =
            with_cancel(cancel, probes::run_all(page, url, options.device)).await?;
        merge_findings(&mut audit, findings);

        // Phase 10: structure, link health, geometry
        audit.heading_structure = match with_cancel(cancel, headings::extract(page)).await? {
            Ok(structure) => Some(structure),
            Err(e) => {
                warn!("Heading extraction failed: {}", e);
                None
            }
        };
        let same_host_links = links::collect_same_host(page, url).await;
        audit.broken_links = Some(links::check_urls(same_host_links.clone(), cancel).await);
        audit.page_dimensions = match with_cancel(cancel, read_dimensions(page)).await? {
            Ok(dimensions) => Some(dimensions),
            Err(e) => {
                warn!("Dimension read failed: {}", e);
                None
            }
        };
        if !options.skip_heavy {
            if let Err(e) = with_cancel(cancel, attach_bounding_boxes(page, &mut audit)).await? {
                warn!("Bounding-box capture failed: {}", e);
            }
        }

        // Phase 11: derived fields
        audit.performance = performance;
        audit.keyboard_navigation = keyboard_navigation;
        audit.domain_hash = domain_hash(url);
        let lang = match with_cancel(cancel, page_language(page)).await? {
            Ok(lang) => lang,
            Err(_) => String::new(),
        };
        audit.human_readable.summary = Some(statement_text(
            &lang,
            audit.score,
            audit.stats.total_violations,
        ));
        if !options.skip_heavy && std::env::var("A11Y_SCREENSHOT_BUCKET").is_ok() {
            match with_cancel(cancel, capture_screenshot(page, url)).await? {
                Ok(path) => audit.screenshot = Some(path),
                Err(e) => warn!("Screenshot capture failed: {}", e),
            }
        }

        info!(
            "Scan of {} complete: score {}, {} violations",
            url, audit.score, audit.stats.total_violations
        );
        Ok((audit, same_host_links))
    }

    /// Tear down the browser
    pub async fn close(self) -> Result<()> {
        self.session.close().await
    }
}

async fn read_dimensions(page: &Page) -> Result<PageDimensions> {
    let raw = eval_json(
        page,
        "JSON.stringify({ width: document.documentElement.scrollWidth, \
         height: document.documentElement.scrollHeight })",
    )
    .await?;
    Ok(PageDimensions {
        width: raw["width"].as_f64().unwrap_or(0.0),
        height: raw["height"].as_f64().unwrap_or(0.0),
    })
}

async fn page_language(page: &Page) -> Result<String> {
    let raw = eval_json(
        page,
        "JSON.stringify({ lang: (document.documentElement.lang || '').toLowerCase() })",
    )
    .await?;
    Ok(raw["lang"].as_str().unwrap_or("").to_string())
}

/// Fill bounding boxes for violation nodes that carry a usable selector
async fn attach_bounding_boxes(page: &Page, audit: &mut AuditReport) -> Result<()> {
    let mut selectors: Vec<String> = Vec::new();
    for violation in audit.violations.iter() {
        for node in &violation.nodes {
            if let Some(selector) = &node.selector {
                if selectors.len() < 50 && !selectors.contains(selector) {
                    selectors.push(selector.clone());
                }
            }
        }
    }
    if selectors.is_empty() {
        return Ok(());
    }

    let js = format!(
        r#"
        (() => {{
            const out = {{}};
            for (const sel of {selectors}) {{
                try {{
                    const el = document.querySelector(sel);
                    if (!el) continue;
                    const r = el.getBoundingClientRect();
                    out[sel] = {{
                        x: r.x + window.scrollX, y: r.y + window.scrollY,
                        width: r.width, height: r.height
                    }};
                }} catch (e) {{}}
            }}
            return JSON.stringify(out);
        }})()
        "#,
        selectors = serde_json::to_string(&selectors)?
    );
    let boxes = eval_json(page, &js).await?;

    let fill = |violations: &mut Vec<crate::report::Violation>| {
        for violation in violations.iter_mut() {
            for node in violation.nodes.iter_mut() {
                let Some(selector) = &node.selector else { continue };
                let Some(rect) = boxes.get(selector.as_str()) else { continue };
                node.bounding_box = Some(BoundingBox {
                    x: rect["x"].as_f64().unwrap_or(0.0),
                    y: rect["y"].as_f64().unwrap_or(0.0),
                    width: rect["width"].as_f64().unwrap_or(0.0),
                    height: rect["height"].as_f64().unwrap_or(0.0),
                });
            }
        }
    };
    fill(&mut audit.violations.critical);
    fill(&mut audit.violations.serious);
    fill(&mut audit.violations.moderate);
    fill(&mut audit.violations.minor);
    Ok(())
}

async fn capture_screenshot(page: &Page, url: &Url) -> Result<String> {
    let name = format!(
        "pagesentry-{}.png",
        domain_hash(url).unwrap_or_else(|| "page".to_string())
    );
    let path = std::env::temp_dir().join(name);
    page.save_screenshot(
        ScreenshotParams::builder().full_page(true).build(),
        &path,
    )
    .await
    .map_err(|e| ScanError::Cdp(e.to_string()))?;
    Ok(path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_https() {
        assert!(validate_scan_url("https://example.com/about").is_ok());
        assert!(validate_scan_url("http://example.com").is_ok());
    }

    #[test]
    fn test_validate_rejects_relative_and_other_schemes() {
        assert!(matches!(
            validate_scan_url("/about"),
            Err(ScanError::InvalidInput { .. })
        ));
        assert!(matches!(
            validate_scan_url("ftp://example.com"),
            Err(ScanError::InvalidInput { .. })
        ));
        assert!(matches!(
            validate_scan_url("mailto:x@example.com"),
            Err(ScanError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_html_extensions() {
        for target in [
            "https://example.com/report.pdf",
            "https://example.com/feed.xml",
            "https://example.com/hero.JPG",
        ] {
            assert!(
                matches!(validate_scan_url(target), Err(ScanError::InvalidInput { .. })),
                "{} should be rejected",
                target
            );
        }
    }

    #[test]
    fn test_domain_hash_is_stable_and_short() {
        let url = Url::parse("https://example.com/a").unwrap();
        let other = Url::parse("https://example.com/b").unwrap();
        assert_eq!(domain_hash(&url), domain_hash(&other));
        assert_eq!(domain_hash(&url).unwrap().len(), 16);
    }

    #[test]
    fn test_scan_request_wire_format() {
        let request: ScanRequest = serde_json::from_str(
            r#"{ "url": "https://example.com", "mode": "crawl", "maxPages": 5, "device": "mobile" }"#,
        )
        .unwrap();
        assert_eq!(request.mode, ScanMode::Crawl);
        assert_eq!(request.max_pages, Some(5));
        assert_eq!(request.device_profile(), DeviceProfile::Mobile);

        let minimal: ScanRequest =
            serde_json::from_str(r#"{ "url": "https://example.com" }"#).unwrap();
        assert_eq!(minimal.mode, ScanMode::Single);
        assert_eq!(minimal.device_profile(), DeviceProfile::Desktop);
    }

    #[test]
    fn test_statement_text_locales() {
        let en = statement_text("en", 92, 3);
        assert!(en.contains("92/100"));
        assert!(en.contains("3"));
        let cs = statement_text("cs-CZ", 92, 3);
        assert!(cs.contains("skóre"));
    }
}
