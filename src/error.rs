//! Error types for pagesentry
//!
//! Centralized error handling using thiserror for derive macros
//! and anyhow for error context propagation at the binary boundary.

use thiserror::Error;

/// Main error type for the pagesentry scan-and-crawl core
///
/// Only `InvalidInput`, `NavigationFailed`, `EngineFailed`,
/// `ResourceExhausted` and `Canceled` escape the scan orchestrator;
/// every other failure degrades to an absent optional report field.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Malformed URL or non-HTML target, rejected before a page is opened
    #[error("Invalid input '{url}': {reason}")]
    InvalidInput { url: String, reason: String },

    /// Navigation failed or timed out; fatal for the scan
    #[error("Failed to navigate to '{url}': {reason}")]
    NavigationFailed { url: String, reason: String },

    /// The in-page rules engine could not produce output; fatal for the scan
    #[error("Rules engine failed: {reason}")]
    EngineFailed { reason: String },

    /// A custom probe threw; logged and skipped, never fatal
    #[error("Probe '{probe}' failed: {reason}")]
    ProbeFailed { probe: String, reason: String },

    /// Browser launch failed; the scanner is unusable until re-initialized
    #[error("Browser unavailable: {reason}")]
    ResourceExhausted { reason: String },

    /// Cancellation signal observed; the browser session was released
    #[error("Scan canceled")]
    Canceled,

    /// CDP (Chrome DevTools Protocol) error
    #[error("CDP error: {0}")]
    Cdp(String),

    /// HTTP request error (sitemap fetch, link probes)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output formatting/writing failed
    #[error("Output error: {reason}")]
    Output { reason: String },
}

/// Result type alias for ScanError
pub type Result<T> = std::result::Result<T, ScanError>;

impl ScanError {
    /// Shorthand for an `InvalidInput` error
    pub fn invalid_input(url: impl Into<String>, reason: impl Into<String>) -> Self {
        ScanError::InvalidInput {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a `NavigationFailed` error
    pub fn navigation(url: impl Into<String>, reason: impl Into<String>) -> Self {
        ScanError::NavigationFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an `EngineFailed` error
    pub fn engine(reason: impl Into<String>) -> Self {
        ScanError::EngineFailed {
            reason: reason.into(),
        }
    }

    /// Shorthand for a `ProbeFailed` error
    pub fn probe(probe: impl Into<String>, reason: impl Into<String>) -> Self {
        ScanError::ProbeFailed {
            probe: probe.into(),
            reason: reason.into(),
        }
    }

    /// True for errors that abort a single scan but not a crawl
    pub fn is_page_fatal(&self) -> bool {
        matches!(
            self,
            ScanError::NavigationFailed { .. } | ScanError::EngineFailed { .. }
        )
    }
}

impl From<chromiumoxide::error::CdpError> for ScanError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        ScanError::Cdp(err.to_string())
    }
}

impl From<url::ParseError> for ScanError {
    fn from(err: url::ParseError) -> Self {
        ScanError::InvalidInput {
            url: String::new(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message() {
        let err = ScanError::invalid_input("https://example.com/file.pdf", "non-HTML extension");
        let msg = err.to_string();
        assert!(msg.contains("file.pdf"));
        assert!(msg.contains("non-HTML extension"));
    }

    #[test]
    fn test_navigation_failed_error() {
        let err = ScanError::navigation("https://example.com", "Connection refused");
        assert!(err.to_string().contains("example.com"));
        assert!(err.to_string().contains("Connection refused"));
        assert!(err.is_page_fatal());
    }

    #[test]
    fn test_probe_failure_is_not_page_fatal() {
        let err = ScanError::probe("carousel-autoplay", "evaluate timed out");
        assert!(!err.is_page_fatal());
        assert!(err.to_string().contains("carousel-autoplay"));
    }
}
