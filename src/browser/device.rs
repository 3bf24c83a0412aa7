//! Device profiles
//!
//! Each profile fixes viewport, user agent, scale factor and the media
//! features the session emulates before navigation.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

const DESKTOP_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
const MOBILE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
                         AppleWebKit/605.1.15 (Version/17.0 Mobile/15E148 Safari/604.1)";
const TABLET_UA: &str = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15 \
                         (Version/17.0 Mobile/15E148 Safari/604.1)";

/// Emulated device profile for a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceProfile {
    /// 1920×1080 desktop viewport (default)
    Desktop,
    /// 375×812 viewport with a mobile user agent
    Mobile,
    /// 768×1024 viewport with a tablet user agent
    Tablet,
    /// Desktop viewport with 200% CSS zoom applied after load
    LowVision,
    /// Desktop viewport with `prefers-reduced-motion: reduce`
    ReducedMotion,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        DeviceProfile::Desktop
    }
}

impl DeviceProfile {
    /// Viewport width and height in CSS pixels
    pub fn viewport(&self) -> (u32, u32) {
        match self {
            DeviceProfile::Mobile => (375, 812),
            DeviceProfile::Tablet => (768, 1024),
            _ => (1920, 1080),
        }
    }

    pub fn device_scale_factor(&self) -> f64 {
        match self {
            DeviceProfile::Mobile | DeviceProfile::Tablet => 2.0,
            _ => 1.0,
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self, DeviceProfile::Mobile | DeviceProfile::Tablet)
    }

    pub fn user_agent(&self) -> &'static str {
        match self {
            DeviceProfile::Mobile => MOBILE_UA,
            DeviceProfile::Tablet => TABLET_UA,
            _ => DESKTOP_UA,
        }
    }

    /// CSS zoom percentage applied after load, when the profile calls for it
    pub fn css_zoom(&self) -> Option<u32> {
        match self {
            DeviceProfile::LowVision => Some(200),
            _ => None,
        }
    }

    pub fn prefers_reduced_motion(&self) -> bool {
        matches!(self, DeviceProfile::ReducedMotion)
    }

    /// Parse the profile names accepted by `SCAN_DEVICE_PROFILE`
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "desktop" => Some(DeviceProfile::Desktop),
            "mobile" => Some(DeviceProfile::Mobile),
            "tablet" => Some(DeviceProfile::Tablet),
            "low-vision" => Some(DeviceProfile::LowVision),
            "reduced-motion" => Some(DeviceProfile::ReducedMotion),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeviceProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DeviceProfile::Desktop => "desktop",
            DeviceProfile::Mobile => "mobile",
            DeviceProfile::Tablet => "tablet",
            DeviceProfile::LowVision => "low-vision",
            DeviceProfile::ReducedMotion => "reduced-motion",
        };
        f.write_str(name)
    }
}
