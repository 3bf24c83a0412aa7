//! autoplay-media probe
//!
//! Flags unmuted audio/video still playing more than three seconds after
//! load. Headless browsers commonly suppress playback; when every
//! autoplaying element reports a frozen clock the probe disables itself.

use std::time::Duration;

use chromiumoxide::Page;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{build_finding, node_from_snippet};
use crate::browser::eval_json;
use crate::error::Result;
use crate::report::{ProbeFindings, Severity, ViolationNode};

const HELP_URL: &str = "https://www.w3.org/WAI/WCAG21/Understanding/audio-control.html";

#[derive(Debug, Clone, Deserialize)]
struct MediaState {
    index: usize,
    muted: bool,
    autoplay: bool,
    paused: bool,
    #[serde(rename = "currentTime")]
    current_time: f64,
    html: String,
    selector: String,
}

const READ_MEDIA_JS: &str = r#"
(() => {
    const media = [];
    document.querySelectorAll('audio, video').forEach((el, index) => {
        let selector = el.tagName.toLowerCase();
        if (el.id) selector = '#' + el.id;
        media.push({
            index,
            muted: el.muted,
            autoplay: el.autoplay,
            paused: el.paused,
            currentTime: el.currentTime,
            html: el.outerHTML.slice(0, 300),
            selector
        });
    });
    return JSON.stringify(media);
})()
"#;

async fn read_media(page: &Page) -> Result<Vec<MediaState>> {
    let raw = eval_json(page, READ_MEDIA_JS).await?;
    Ok(serde_json::from_value(raw).unwrap_or_default())
}

/// Run the autoplay-media probe
pub async fn check(page: &Page, url: &Url) -> Result<Option<ProbeFindings>> {
    let mut media = read_media(page).await?;
    media.retain(|m| !m.muted);
    if media.is_empty() {
        return Ok(None);
    }

    // Autoplaying elements whose clock has not started get a grace read
    if media.iter().any(|m| m.autoplay && m.current_time == 0.0) {
        tokio::time::sleep(Duration::from_secs(2)).await;
        media = read_media(page).await?;
        media.retain(|m| !m.muted);
    }

    let playing: Vec<&MediaState> = media
        .iter()
        .filter(|m| !m.paused && m.current_time > 0.0)
        .collect();
    if playing.is_empty() {
        if media.iter().any(|m| m.autoplay && m.current_time == 0.0) {
            // Headless profile suppresses playback; the probe cannot judge
            debug!("autoplay-media: playback suppressed by the browser, probe disabled");
        }
        return Ok(None);
    }

    let suspects: Vec<usize> = playing.iter().map(|m| m.index).collect();
    tokio::time::sleep(Duration::from_millis(3500)).await;

    let confirmed = read_media(page).await?;
    let nodes: Vec<ViolationNode> = confirmed
        .iter()
        .filter(|m| {
            suspects.contains(&m.index) && !m.paused && !m.muted && m.current_time > 3.0
        })
        .map(|m| {
            node_from_snippet(
                m.html.clone(),
                m.selector.clone(),
                format!(
                    "Unmuted media is still playing {:.1} s after load.",
                    m.current_time
                ),
            )
        })
        .collect();

    if nodes.is_empty() {
        return Ok(None);
    }

    Ok(Some(build_finding(
        "autoplay-media",
        "Media must not autoplay with sound",
        "Audio playing on load drowns out screen readers; it must stop within three seconds or be controllable.",
        Severity::Critical,
        HELP_URL,
        nodes,
        url,
    )))
}
