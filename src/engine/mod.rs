//! Rules engine adapter
//!
//! Drives the axe-core rules engine inside the page, configured for
//! WCAG 2.0/2.1/2.2 A+AA tags, and lifts its results into plain structs
//! the normalizer consumes. Engine failure is fatal for the scan.

use chromiumoxide::Page;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::browser::eval_json;
use crate::error::{Result, ScanError};

/// Pinned engine bundle; fetched once per process and injected per page.
const ENGINE_BUNDLE_URL: &str = "https://cdn.jsdelivr.net/npm/axe-core@4.10.2/axe.min.js";

/// WCAG conformance tags the engine runs with
const WCAG_TAGS: &[&str] = &["wcag2a", "wcag2aa", "wcag21a", "wcag21aa", "wcag22aa"];

static ENGINE_SOURCE: OnceCell<String> = OnceCell::const_new();

/// One affected node as reported by the engine
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineNode {
    pub html: String,
    /// Selector chain; multiple entries traverse shadow roots
    pub target: Vec<String>,
    #[serde(default)]
    pub failure_summary: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
}

/// One violated rule as reported by the engine
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineViolation {
    pub id: String,
    #[serde(default)]
    pub impact: Option<String>,
    pub help: String,
    pub description: String,
    pub help_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<EngineNode>,
}

/// Normalized engine output
#[derive(Debug, Clone)]
pub struct EngineResult {
    pub browser_version: String,
    pub engine_version: String,
    pub violations: Vec<EngineViolation>,
}

#[derive(Debug, Deserialize)]
struct RawEngineRun {
    #[serde(rename = "testEngine")]
    test_engine: RawTestEngine,
    #[serde(default)]
    violations: Vec<EngineViolation>,
}

#[derive(Debug, Deserialize)]
struct RawTestEngine {
    #[allow(dead_code)]
    name: String,
    version: String,
}

async fn engine_source() -> Result<&'static str> {
    let source = ENGINE_SOURCE
        .get_or_try_init(|| async {
            info!("Fetching rules engine bundle from {}", ENGINE_BUNDLE_URL);
            let body = reqwest::get(ENGINE_BUNDLE_URL).await?.text().await?;
            Ok::<_, ScanError>(body)
        })
        .await
        .map_err(|e| ScanError::engine(format!("could not fetch engine bundle: {}", e)))?;
    Ok(source.as_str())
}

/// Make sure the engine is installed in the current document
async fn ensure_engine(page: &Page) -> Result<()> {
    let present = page
        .evaluate("typeof window.axe !== 'undefined'")
        .await
        .map_err(|e| ScanError::engine(e.to_string()))?
        .value()
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    if present {
        debug!("Rules engine already present in page");
        return Ok(());
    }

    let source = engine_source().await?;
    page.evaluate(source)
        .await
        .map_err(|e| ScanError::engine(format!("engine injection failed: {}", e)))?;
    Ok(())
}

/// Run the rules engine against the current document
///
/// # Arguments
/// * `page` - The page to analyze, already navigated and settled
/// * `browser_version` - Carried through into the result metadata
pub async fn analyze(page: &Page, browser_version: &str) -> Result<EngineResult> {
    ensure_engine(page).await?;

    let tags = serde_json::to_string(WCAG_TAGS)?;
    let js = format!(
        r#"
        axe.run(document, {{ runOnly: {{ type: 'tag', values: {tags} }} }})
            .then(r => JSON.stringify({{
                testEngine: r.testEngine,
                violations: r.violations.map(v => ({{
                    id: v.id,
                    impact: v.impact,
                    help: v.help,
                    description: v.description,
                    helpUrl: v.helpUrl,
                    tags: v.tags,
                    nodes: v.nodes.map(n => ({{
                        html: n.html,
                        target: n.target,
                        failureSummary: n.failureSummary,
                        impact: n.impact
                    }}))
                }}))
            }}))
        "#
    );

    let raw = eval_json(page, &js)
        .await
        .map_err(|e| ScanError::engine(e.to_string()))?;
    let run: RawEngineRun = serde_json::from_value(raw)
        .map_err(|e| ScanError::engine(format!("unparseable engine output: {}", e)))?;

    info!(
        "Rules engine pass complete: {} violated rules",
        run.violations.len()
    );

    Ok(EngineResult {
        browser_version: browser_version.to_string(),
        engine_version: run.test_engine.version,
        violations: run.violations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_run_deserializes() {
        let raw = serde_json::json!({
            "testEngine": { "name": "axe-core", "version": "4.10.2" },
            "violations": [{
                "id": "image-alt",
                "impact": "critical",
                "help": "Images must have alternate text",
                "description": "Ensures <img> elements have alternate text",
                "helpUrl": "https://dequeuniversity.com/rules/axe/4.10/image-alt",
                "tags": ["wcag2a", "wcag111"],
                "nodes": [{
                    "html": "<img src=\"logo.png\">",
                    "target": ["img"],
                    "failureSummary": "Element has no alt attribute",
                    "impact": "critical"
                }]
            }]
        });
        let run: RawEngineRun = serde_json::from_value(raw).unwrap();
        assert_eq!(run.test_engine.version, "4.10.2");
        assert_eq!(run.violations.len(), 1);
        assert_eq!(run.violations[0].nodes[0].target, vec!["img"]);
    }

    #[test]
    fn test_missing_optional_fields_tolerated() {
        let raw = serde_json::json!({
            "testEngine": { "name": "axe-core", "version": "4.10.2" },
            "violations": [{
                "id": "list",
                "help": "h",
                "description": "d",
                "helpUrl": "u"
            }]
        });
        let run: RawEngineRun = serde_json::from_value(raw).unwrap();
        assert!(run.violations[0].impact.is_none());
        assert!(run.violations[0].nodes.is_empty());
    }

    #[test]
    fn test_wcag_tag_set() {
        assert!(WCAG_TAGS.contains(&"wcag2aa"));
        assert!(WCAG_TAGS.contains(&"wcag22aa"));
        assert!(!WCAG_TAGS.contains(&"wcag2aaa"));
    }
}
