//! orientation-lock probe
//!
//! Emulates portrait and landscape viewports and inspects root elements
//! for a 90° CSS rotation that forces one orientation. The original
//! viewport is restored unconditionally.

use chromiumoxide::Page;
use url::Url;

use super::{build_finding, node_from_snippet};
use crate::browser::{eval_json, set_viewport, DeviceProfile};
use crate::error::Result;
use crate::report::{ProbeFindings, Severity};

const HELP_URL: &str = "https://www.w3.org/WAI/WCAG21/Understanding/orientation.html";
const PORTRAIT: (u32, u32) = (375, 812);
const LANDSCAPE: (u32, u32) = (812, 375);

const TRANSFORM_JS: &str = r#"
(() => {
    const candidates = [];
    const push = (el, name) => { if (el) candidates.push({ el, name }); };
    push(document.body, 'body');
    push(document.documentElement, 'html');
    push(document.querySelector('#app'), '#app');
    push(document.querySelector('#root'), '#root');
    push(document.querySelector('main'), 'main');
    const out = [];
    for (const { el, name } of candidates) {
        const transform = window.getComputedStyle(el).transform;
        if (transform && transform !== 'none') {
            out.push({ name, transform, html: el.outerHTML.slice(0, 200) });
        }
    }
    return JSON.stringify(out);
})()
"#;

/// Extract the rotation angle in degrees from a computed `matrix(...)`
pub(crate) fn rotation_angle(transform: &str) -> Option<f64> {
    let inner = transform
        .trim()
        .strip_prefix("matrix(")?
        .strip_suffix(')')?;
    let parts: Vec<f64> = inner
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    if parts.len() < 2 {
        return None;
    }
    Some(parts[1].atan2(parts[0]).to_degrees())
}

/// True when the angle is a quarter turn in either direction
pub(crate) fn is_quarter_turn(angle: f64) -> bool {
    (angle.abs() - 90.0).abs() < 0.5
}

async fn rotated_root(page: &Page) -> Result<Option<(String, String, f64)>> {
    let raw = eval_json(page, TRANSFORM_JS).await?;
    if let Some(entries) = raw.as_array() {
        for entry in entries {
            let transform = entry["transform"].as_str().unwrap_or("");
            if let Some(angle) = rotation_angle(transform) {
                if is_quarter_turn(angle) {
                    return Ok(Some((
                        entry["name"].as_str().unwrap_or("body").to_string(),
                        entry["html"].as_str().unwrap_or("<body>").to_string(),
                        angle,
                    )));
                }
            }
        }
    }
    Ok(None)
}

/// Run the orientation-lock probe
///
/// `profile` supplies the viewport restored after the check.
pub async fn check(
    page: &Page,
    url: &Url,
    profile: DeviceProfile,
) -> Result<Option<ProbeFindings>> {
    let result = async {
        set_viewport(page, PORTRAIT.0, PORTRAIT.1, 2.0, true).await?;
        if let Some(found) = rotated_root(page).await? {
            return Ok::<_, crate::error::ScanError>(Some(found));
        }
        set_viewport(page, LANDSCAPE.0, LANDSCAPE.1, 2.0, true).await?;
        rotated_root(page).await
    }
    .await;

    // Restore the scan viewport no matter what happened above
    let (width, height) = profile.viewport();
    set_viewport(
        page,
        width,
        height,
        profile.device_scale_factor(),
        profile.is_mobile(),
    )
    .await?;

    let Some((name, html, angle)) = result? else {
        return Ok(None);
    };

    Ok(Some(build_finding(
        "orientation-lock",
        "Content must not be locked to one orientation",
        "Rotating the page with CSS forces users into a single screen orientation.",
        Severity::Serious,
        HELP_URL,
        vec![node_from_snippet(
            html,
            name,
            format!("Root element is rotated {:.0}° via CSS transform.", angle),
        )],
        url,
    )))
}
