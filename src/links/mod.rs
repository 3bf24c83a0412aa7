//! Link-health checker
//!
//! Sweeps same-host anchors with parallel HEAD probes. The sweep never
//! fails the scan; any error degrades to an empty summary.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::Page;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::browser::eval_json;
use crate::report::{BrokenLink, BrokenLinks};

/// At most this many links are probed per page
const MAX_LINKS: usize = 40;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Extensions that never resolve to scannable HTML documents
pub const NON_HTML_EXTENSIONS: &[&str] = &[
    "xml", "pdf", "jpg", "jpeg", "png", "gif", "svg", "webp", "zip", "doc", "docx", "xls",
    "xlsx", "mp4", "mp3", "css", "js", "json", "ico", "woff", "woff2",
];

/// True when the URL path ends in an extension we never treat as HTML
pub fn has_non_html_extension(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    match path.rsplit_once('.') {
        Some((_, ext)) => NON_HTML_EXTENSIONS.contains(&ext),
        None => false,
    }
}

const COLLECT_LINKS_JS: &str = r#"
(() => {
    const hrefs = [];
    document.querySelectorAll('a[href]').forEach(a => {
        if (a.href) hrefs.push(a.href);
    });
    return JSON.stringify(hrefs);
})()
"#;

/// Keep same-host HTTP(S) links to HTML documents, deduplicated, capped
pub fn filter_candidates(hrefs: &[String], base: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    for href in hrefs {
        let Ok(url) = Url::parse(href) else {
            continue;
        };
        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }
        if url.host_str() != base.host_str() {
            continue;
        }
        if has_non_html_extension(&url) {
            continue;
        }
        let mut url = url;
        url.set_fragment(None);
        let key = url.to_string();
        if seen.insert(key.clone()) {
            kept.push(key);
            if kept.len() >= MAX_LINKS {
                break;
            }
        }
    }
    kept
}

async fn probe(client: &reqwest::Client, url: &str) -> Option<BrokenLink> {
    match client.head(url).timeout(REQUEST_TIMEOUT).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            if (200..400).contains(&status) {
                None
            } else {
                Some(BrokenLink {
                    url: url.to_string(),
                    status: Some(status),
                    reason: None,
                })
            }
        }
        Err(e) => Some(BrokenLink {
            url: url.to_string(),
            status: e.status().map(|s| s.as_u16()),
            reason: Some(if e.is_timeout() {
                "timed out".to_string()
            } else {
                e.to_string()
            }),
        }),
    }
}

/// Collect same-host HTML links from the current page, best effort
pub async fn collect_same_host(page: &Page, base: &Url) -> Vec<String> {
    let hrefs = match eval_json(page, COLLECT_LINKS_JS).await {
        Ok(raw) => serde_json::from_value::<Vec<String>>(raw).unwrap_or_default(),
        Err(e) => {
            warn!("Link collection failed: {}", e);
            return Vec::new();
        }
    };
    filter_candidates(&hrefs, base)
}

/// Probe the collected links with parallel HEAD requests
///
/// Returns an empty summary on any internal error; the scan never fails
/// because of the link sweep.
pub async fn check_urls(candidates: Vec<String>, cancel: &CancellationToken) -> BrokenLinks {
    if candidates.is_empty() {
        return BrokenLinks::default();
    }
    debug!("Probing {} same-host links", candidates.len());

    let client = match reqwest::Client::builder().build() {
        Ok(client) => client,
        Err(e) => {
            warn!("Link checker client build failed: {}", e);
            return BrokenLinks::default();
        }
    };

    let total_checked = candidates.len();
    let semaphore = Arc::new(Semaphore::new(MAX_LINKS));
    let mut handles = Vec::with_capacity(total_checked);
    for url in candidates {
        let client = client.clone();
        let semaphore = Arc::clone(&semaphore);
        let cancel = cancel.clone();
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire().await.ok()?;
            tokio::select! {
                _ = cancel.cancelled() => None,
                broken = probe(&client, &url) => broken,
            }
        }));
    }

    let mut broken = Vec::new();
    for handle in handles {
        if let Ok(Some(link)) = handle.await {
            broken.push(link);
        }
    }

    info!("Link sweep: {} checked, {} broken", total_checked, broken.len());
    BrokenLinks {
        total_checked,
        broken,
    }
}
