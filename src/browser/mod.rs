//! Browser session facade
//!
//! Chrome launch/teardown, device profiles, navigation with bounded waits,
//! cookie-banner dismissal, and the narrow evaluate/keyboard/viewport
//! primitives the analyzers and probes build on.

mod device;
mod session;

pub use device::DeviceProfile;
pub use session::{
    dismiss_cookie_banners, eval_json, press_tab, set_viewport, BrowserSession, SessionOptions,
};
