//! Browser session - Chrome lifecycle management
//!
//! Launches Chrome in headless mode with consistent flags, applies device
//! profiles, and exposes the evaluate/keyboard/viewport primitives used by
//! the analyzers and probes.

use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::{
    MediaFeature, SetDeviceMetricsOverrideParams, SetEmulatedMediaParams,
    SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::device::DeviceProfile;
use crate::error::{Result, ScanError};

/// Fixed selectors tried first when dismissing cookie banners
const COOKIE_SELECTORS: &[&str] = &[
    "#onetrust-accept-btn-handler",
    "#CybotCookiebotDialogBodyLevelButtonLevelOptinAllowAll",
    "button[data-cookiebanner='accept_button']",
    ".cc-allow",
    ".cookie-accept",
    "#cookie-accept",
    "[data-testid='cookie-accept-all']",
];

/// Button-text keywords tried second, English and Czech
const COOKIE_TEXT_PATTERNS: &[&str] = &[
    "accept all",
    "accept cookies",
    "accept",
    "agree",
    "allow all",
    "i understand",
    "got it",
    "souhlasím",
    "přijmout vše",
    "přijmout",
    "povolit vše",
    "rozumím",
];

/// Browser session configuration
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Manual Chrome path override
    pub chrome_path: Option<String>,
    /// Disable sandbox (required for Docker/root)
    pub no_sandbox: bool,
    /// Navigation timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            chrome_path: None,
            no_sandbox: false,
            timeout_secs: 30,
        }
    }
}

/// Browser session facade - one Chrome per `Scanner`
pub struct BrowserSession {
    browser: Browser,
    options: SessionOptions,
    version: String,
    handler: Option<JoinHandle<()>>,
}

impl BrowserSession {
    /// Launch a headless Chrome with the default options
    pub async fn launch() -> Result<Self> {
        Self::launch_with(SessionOptions::default()).await
    }

    /// Launch a headless Chrome
    ///
    /// Any launch failure surfaces as `ResourceExhausted`; the scanner is
    /// unusable until re-initialized.
    pub async fn launch_with(options: SessionOptions) -> Result<Self> {
        let args = Self::build_launch_args(&options);
        debug!("Chrome launch args: {:?}", args);

        let mut builder = BrowserConfig::builder().args(args).viewport(None);
        if let Some(path) = options.chrome_path.as_deref().map(find_chrome) {
            let path = path?;
            info!("Using Chrome at: {:?}", path);
            builder = builder.chrome_executable(path);
        } else if let Ok(path) = find_chrome("") {
            info!("Found system Chrome: {:?}", path);
            builder = builder.chrome_executable(path);
        }

        let config = builder.build().map_err(|e| ScanError::ResourceExhausted {
            reason: e.to_string(),
        })?;

        let (browser, mut handler) =
            Browser::launch(config)
                .await
                .map_err(|e| ScanError::ResourceExhausted {
                    reason: e.to_string(),
                })?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        let version = browser
            .version()
            .await
            .map(|v| v.product)
            .unwrap_or_else(|_| "HeadlessChrome/unknown".to_string());

        info!("Browser launched: {}", version);

        Ok(Self {
            browser,
            options,
            version,
            handler: Some(handler_task),
        })
    }

    fn build_launch_args(options: &SessionOptions) -> Vec<String> {
        let mut args = vec![
            "--headless".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-extensions".to_string(),
            "--disable-background-networking".to_string(),
            "--disable-sync".to_string(),
            "--disable-translate".to_string(),
            "--metrics-recording-only".to_string(),
            "--disable-infobars".to_string(),
            "--disable-popup-blocking".to_string(),
            "--disable-gpu".to_string(),
            // Keeps layout widths identical between scan and fullpage screenshot
            "--hide-scrollbars".to_string(),
            "--autoplay-policy=no-user-gesture-required".to_string(),
        ];

        if options.no_sandbox {
            args.push("--no-sandbox".to_string());
            args.push("--disable-setuid-sandbox".to_string());
            args.push("--disable-dev-shm-usage".to_string());
        }

        args
    }

    /// Browser product string, e.g. "HeadlessChrome/126.0.6478.126"
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Navigation timeout configured for this session
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.options.timeout_secs)
    }

    /// Open a fresh page, apply the device profile, and install any
    /// pre-navigation scripts the profile requires.
    pub async fn new_page(&self, profile: DeviceProfile) -> Result<Page> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScanError::ResourceExhausted {
                reason: format!("failed to create page: {}", e),
            })?;

        let (width, height) = profile.viewport();
        set_viewport(
            &page,
            width,
            height,
            profile.device_scale_factor(),
            profile.is_mobile(),
        )
        .await?;

        page.execute(
            SetUserAgentOverrideParams::builder()
                .user_agent(profile.user_agent())
                .build()
                .map_err(ScanError::Cdp)?,
        )
        .await?;

        if profile.prefers_reduced_motion() {
            page.execute(SetEmulatedMediaParams {
                media: None,
                features: Some(vec![MediaFeature {
                    name: "prefers-reduced-motion".to_string(),
                    value: "reduce".to_string(),
                }]),
            })
            .await?;
        }

        if let Some(zoom) = profile.css_zoom() {
            let script = format!(
                "document.addEventListener('DOMContentLoaded', () => {{ \
                 document.body.style.zoom = '{}%'; }});",
                zoom
            );
            page.execute(
                AddScriptToEvaluateOnNewDocumentParams::builder()
                    .source(script)
                    .build()
                    .map_err(ScanError::Cdp)?,
            )
            .await?;
        }

        Ok(page)
    }

    /// Install a script that runs in every new document before any page
    /// script does. Used for the performance observers.
    pub async fn install_on_new_document(&self, page: &Page, source: &str) -> Result<()> {
        page.execute(
            AddScriptToEvaluateOnNewDocumentParams::builder()
                .source(source)
                .build()
                .map_err(ScanError::Cdp)?,
        )
        .await?;
        Ok(())
    }

    /// Navigate with a network-idle wait, bounded by the session timeout
    /// and interruptible through the cancellation token.
    pub async fn navigate(&self, page: &Page, url: &str, cancel: &CancellationToken) -> Result<()> {
        let goto = async {
            page.goto(url)
                .await
                .map_err(|e| ScanError::navigation(url, e.to_string()))?;
            page.wait_for_navigation()
                .await
                .map_err(|e| ScanError::navigation(url, format!("idle wait failed: {}", e)))?;
            Ok::<(), ScanError>(())
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(ScanError::Canceled),
            timed = tokio::time::timeout(self.timeout(), goto) => match timed {
                Err(_) => Err(ScanError::navigation(
                    url,
                    format!("timed out after {}s", self.options.timeout_secs),
                )),
                Ok(result) => result,
            },
        }?;

        debug!("Navigated to: {}", url);
        Ok(())
    }

    /// Close the browser and stop the event handler task
    pub async fn close(mut self) -> Result<()> {
        info!("Closing browser...");
        if let Ok(pages) = self.browser.pages().await {
            for page in pages {
                if let Err(e) = page.close().await {
                    warn!("Failed to close page: {}", e);
                }
            }
        }
        if let Err(e) = self.browser.close().await {
            warn!("Browser close failed: {}", e);
        }
        let _ = self.browser.wait().await;
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        Ok(())
    }
}

impl std::fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserSession")
            .field("version", &self.version)
            .field("options", &self.options)
            .finish()
    }
}

/// Locate a Chrome/Chromium binary
///
/// A non-empty `hint` wins; otherwise well-known install locations are
/// probed in order.
fn find_chrome(hint: &str) -> Result<PathBuf> {
    if !hint.is_empty() {
        let path = PathBuf::from(hint);
        if path.exists() {
            return Ok(path);
        }
        return Err(ScanError::ResourceExhausted {
            reason: format!("Chrome not found at '{}'", hint),
        });
    }

    let candidates = [
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
    ];
    for candidate in candidates {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return Ok(path);
        }
    }

    Err(ScanError::ResourceExhausted {
        reason: "Chrome/Chromium not found; set CHROME_PATH or --chrome-path".to_string(),
    })
}

/// Evaluate a JS expression and decode its result as JSON
///
/// In-page scripts return either `JSON.stringify(...)` strings or plain
/// JSON values; both are accepted. This is the single capability every
/// probe builds on.
pub async fn eval_json(page: &Page, js: &str) -> Result<Value> {
    let result = page
        .evaluate(js)
        .await
        .map_err(|e| ScanError::Cdp(e.to_string()))?;
    match result.value() {
        Some(Value::String(s)) => Ok(serde_json::from_str(s)?),
        Some(v) => Ok(v.clone()),
        None => Ok(Value::Null),
    }
}

/// Dispatch one Tab key press (down + up)
pub async fn press_tab(page: &Page) -> Result<()> {
    for kind in [DispatchKeyEventType::RawKeyDown, DispatchKeyEventType::KeyUp] {
        page.execute(
            DispatchKeyEventParams::builder()
                .r#type(kind)
                .key("Tab")
                .code("Tab")
                .windows_virtual_key_code(9)
                .native_virtual_key_code(9)
                .build()
                .map_err(ScanError::Cdp)?,
        )
        .await?;
    }
    Ok(())
}

/// Override the viewport; probes that change it must restore it on exit
pub async fn set_viewport(
    page: &Page,
    width: u32,
    height: u32,
    device_scale_factor: f64,
    mobile: bool,
) -> Result<()> {
    page.execute(
        SetDeviceMetricsOverrideParams::builder()
            .width(width as i64)
            .height(height as i64)
            .device_scale_factor(device_scale_factor)
            .mobile(mobile)
            .build()
            .map_err(ScanError::Cdp)?,
    )
    .await?;
    Ok(())
}

/// Dismiss cookie banners: fixed selector whitelist first, then
/// language-aware button-text matching. Best effort; returns whether
/// anything was clicked.
pub async fn dismiss_cookie_banners(page: &Page) -> Result<bool> {
    let selectors = serde_json::to_string(COOKIE_SELECTORS)?;
    let patterns = serde_json::to_string(COOKIE_TEXT_PATTERNS)?;
    let js = format!(
        r#"
        (() => {{
            const selectors = {selectors};
            for (const sel of selectors) {{
                const el = document.querySelector(sel);
                if (el && el.offsetParent !== null) {{
                    el.click();
                    return JSON.stringify({{ clicked: true, via: 'selector' }});
                }}
            }}
            const patterns = {patterns};
            const candidates = document.querySelectorAll('button, a, [role="button"]');
            for (const el of candidates) {{
                const text = (el.textContent || '').trim().toLowerCase();
                if (!text || text.length > 40) continue;
                if (patterns.some(p => text.includes(p))) {{
                    el.click();
                    return JSON.stringify({{ clicked: true, via: 'text' }});
                }}
            }}
            return JSON.stringify({{ clicked: false }});
        }})()
        "#
    );

    let mut clicked = false;
    // One retry; some banners render a beat after load
    for attempt in 0..2 {
        let outcome = eval_json(page, &js).await?;
        if outcome["clicked"].as_bool().unwrap_or(false) {
            debug!(
                "Cookie banner dismissed via {}",
                outcome["via"].as_str().unwrap_or("?")
            );
            clicked = true;
            break;
        }
        if attempt == 0 {
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
    }
    Ok(clicked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_args_include_scrollbar_hiding() {
        let args = BrowserSession::build_launch_args(&SessionOptions::default());
        assert!(args.iter().any(|a| a == "--hide-scrollbars"));
        assert!(args.iter().any(|a| a == "--headless"));
        assert!(!args.iter().any(|a| a == "--no-sandbox"));
    }

    #[test]
    fn test_launch_args_docker() {
        let options = SessionOptions {
            no_sandbox: true,
            ..Default::default()
        };
        let args = BrowserSession::build_launch_args(&options);
        assert!(args.iter().any(|a| a == "--no-sandbox"));
        assert!(args.iter().any(|a| a == "--disable-dev-shm-usage"));
    }

    #[test]
    fn test_find_chrome_missing_hint_errors() {
        let result = find_chrome("/definitely/not/a/real/chrome");
        assert!(matches!(
            result,
            Err(ScanError::ResourceExhausted { .. })
        ));
    }

    #[test]
    fn test_cookie_patterns_cover_czech() {
        assert!(COOKIE_TEXT_PATTERNS.iter().any(|p| *p == "přijmout vše"));
        assert!(COOKIE_TEXT_PATTERNS.iter().any(|p| *p == "accept all"));
    }
}
