//! meta-viewport probe
//!
//! Fails pages whose viewport meta tag blocks pinch zoom, either with
//! `user-scalable=no/0` or a `maximum-scale` below 2.

use chromiumoxide::Page;
use url::Url;

use super::{build_finding, node_from_snippet};
use crate::browser::eval_json;
use crate::error::Result;
use crate::report::{ProbeFindings, Severity};

const HELP_URL: &str = "https://www.w3.org/WAI/WCAG21/Understanding/resize-text.html";

const VIEWPORT_JS: &str = r#"
(() => {
    const meta = document.querySelector('meta[name="viewport"]');
    if (!meta) return JSON.stringify({ present: false });
    return JSON.stringify({
        present: true,
        content: meta.getAttribute('content') || '',
        html: meta.outerHTML
    });
})()
"#;

/// Why a viewport content value restricts zooming
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ZoomRestriction {
    UserScalableDisabled,
    MaximumScaleTooLow(f64),
}

impl std::fmt::Display for ZoomRestriction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoomRestriction::UserScalableDisabled => {
                write!(f, "user-scalable disables pinch zoom")
            }
            ZoomRestriction::MaximumScaleTooLow(scale) => {
                write!(f, "maximum-scale={} caps zoom below 2", scale)
            }
        }
    }
}

/// Parse a viewport content attribute and collect zoom restrictions
pub(crate) fn zoom_restrictions(content: &str) -> Vec<ZoomRestriction> {
    let mut restrictions = Vec::new();
    for part in content.split(',') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim().to_ascii_lowercase();
        match key.as_str() {
            "user-scalable" if value == "no" || value == "0" => {
                restrictions.push(ZoomRestriction::UserScalableDisabled);
            }
            "maximum-scale" => {
                if let Ok(scale) = value.parse::<f64>() {
                    if scale < 2.0 {
                        restrictions.push(ZoomRestriction::MaximumScaleTooLow(scale));
                    }
                }
            }
            _ => {}
        }
    }
    restrictions
}

/// Run the meta-viewport probe
pub async fn check(page: &Page, url: &Url) -> Result<Option<ProbeFindings>> {
    let raw = eval_json(page, VIEWPORT_JS).await?;
    if !raw["present"].as_bool().unwrap_or(false) {
        return Ok(None);
    }

    let content = raw["content"].as_str().unwrap_or("");
    let restrictions = zoom_restrictions(content);
    if restrictions.is_empty() {
        return Ok(None);
    }

    let summary = restrictions
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("; ");

    Ok(Some(build_finding(
        "meta-viewport",
        "Zooming and scaling must not be disabled",
        "Blocking pinch zoom prevents low-vision users from enlarging content.",
        Severity::Critical,
        HELP_URL,
        vec![node_from_snippet(
            raw["html"].as_str().unwrap_or("<meta name=\"viewport\">"),
            "meta[name=\"viewport\"]",
            summary,
        )],
        url,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_scalable_no() {
        let r = zoom_restrictions("width=device-width, user-scalable=no");
        assert_eq!(r, vec![ZoomRestriction::UserScalableDisabled]);
    }

    #[test]
    fn test_user_scalable_zero() {
        let r = zoom_restrictions("user-scalable=0");
        assert_eq!(r, vec![ZoomRestriction::UserScalableDisabled]);
    }

    #[test]
    fn test_maximum_scale_below_two() {
        let r = zoom_restrictions("width=device-width, maximum-scale=1.0");
        assert_eq!(r, vec![ZoomRestriction::MaximumScaleTooLow(1.0)]);
    }

    #[test]
    fn test_maximum_scale_two_is_fine() {
        assert!(zoom_restrictions("maximum-scale=2").is_empty());
        assert!(zoom_restrictions("maximum-scale=5.0").is_empty());
    }

    #[test]
    fn test_benign_viewport() {
        assert!(zoom_restrictions("width=device-width, initial-scale=1").is_empty());
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let r = zoom_restrictions("Width=device-width , USER-SCALABLE = NO ");
        assert_eq!(r, vec![ZoomRestriction::UserScalableDisabled]);
    }
}
