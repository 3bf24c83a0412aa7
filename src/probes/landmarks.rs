//! landmarks probe
//!
//! Flags a missing or duplicated main landmark, and missing
//! navigation/banner/contentinfo landmarks where the page layout
//! clearly calls for them.

use chromiumoxide::Page;
use url::Url;

use super::{build_finding, node_from_snippet};
use crate::browser::eval_json;
use crate::error::Result;
use crate::report::{ProbeFindings, Severity, ViolationNode};

const HELP_URL: &str = "https://www.w3.org/WAI/WCAG21/Understanding/info-and-relationships.html";

const LANDMARK_JS: &str = r#"
(() => {
    const mains = document.querySelectorAll('main, [role="main"]').length;
    const navs = document.querySelectorAll('nav, [role="navigation"]').length;
    const banners = document.querySelectorAll('header, [role="banner"]').length;
    const contentinfo = document.querySelectorAll('footer, [role="contentinfo"]').length;
    const links = document.querySelectorAll('a[href]').length;
    const bodyHeight = document.body ? document.body.scrollHeight : 0;
    return JSON.stringify({ mains, navs, banners, contentinfo, links, bodyHeight });
})()
"#;

/// Landmark counts collected from the page
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LandmarkCounts {
    pub mains: u64,
    pub navs: u64,
    pub banners: u64,
    pub contentinfo: u64,
    pub links: u64,
    pub body_height: f64,
}

/// Decide which landmark problems the counts describe
pub(crate) fn detect(counts: &LandmarkCounts) -> Vec<String> {
    let mut problems = Vec::new();
    if counts.mains == 0 {
        problems.push("The page has no <main> landmark.".to_string());
    }
    if counts.mains > 1 {
        problems.push(format!(
            "The page has {} main landmarks; expected exactly one.",
            counts.mains
        ));
    }
    // Navigation is expected once a page carries a real link set
    if counts.navs == 0 && counts.links >= 10 {
        problems.push("The page links widely but declares no navigation landmark.".to_string());
    }
    // Banner and contentinfo are expected on full-height pages
    if counts.body_height > 1200.0 {
        if counts.banners == 0 {
            problems.push("The page has no banner (header) landmark.".to_string());
        }
        if counts.contentinfo == 0 {
            problems.push("The page has no contentinfo (footer) landmark.".to_string());
        }
    }
    problems
}

/// Run the landmarks probe
pub async fn check(page: &Page, url: &Url) -> Result<Option<ProbeFindings>> {
    let raw = eval_json(page, LANDMARK_JS).await?;
    let counts = LandmarkCounts {
        mains: raw["mains"].as_u64().unwrap_or(0),
        navs: raw["navs"].as_u64().unwrap_or(0),
        banners: raw["banners"].as_u64().unwrap_or(0),
        contentinfo: raw["contentinfo"].as_u64().unwrap_or(0),
        links: raw["links"].as_u64().unwrap_or(0),
        body_height: raw["bodyHeight"].as_f64().unwrap_or(0.0),
    };

    let problems = detect(&counts);
    if problems.is_empty() {
        return Ok(None);
    }

    let nodes: Vec<ViolationNode> = problems
        .into_iter()
        .map(|problem| node_from_snippet("<body>", "body", problem))
        .collect();

    Ok(Some(build_finding(
        "landmarks",
        "Pages must expose the expected landmark regions",
        "Landmark regions let assistive-technology users orient and jump around the page.",
        Severity::Moderate,
        HELP_URL,
        nodes,
        url,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_main() {
        let counts = LandmarkCounts {
            mains: 0,
            ..Default::default()
        };
        let problems = detect(&counts);
        assert!(problems.iter().any(|p| p.contains("no <main>")));
    }

    #[test]
    fn test_duplicate_main() {
        let counts = LandmarkCounts {
            mains: 2,
            ..Default::default()
        };
        let problems = detect(&counts);
        assert!(problems.iter().any(|p| p.contains("2 main landmarks")));
    }

    #[test]
    fn test_nav_expected_with_many_links() {
        let counts = LandmarkCounts {
            mains: 1,
            navs: 0,
            links: 25,
            ..Default::default()
        };
        let problems = detect(&counts);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("navigation"));
    }

    #[test]
    fn test_short_page_skips_banner_checks() {
        let counts = LandmarkCounts {
            mains: 1,
            body_height: 600.0,
            ..Default::default()
        };
        assert!(detect(&counts).is_empty());
    }

    #[test]
    fn test_tall_page_expects_banner_and_footer() {
        let counts = LandmarkCounts {
            mains: 1,
            body_height: 3000.0,
            ..Default::default()
        };
        let problems = detect(&counts);
        assert_eq!(problems.len(), 2);
    }
}
