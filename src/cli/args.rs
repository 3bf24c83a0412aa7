//! CLI argument parsing using clap
//!
//! Defines all command-line arguments and their validation.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::browser::DeviceProfile;

/// pagesentry - accessibility, performance and link-health auditor
///
/// Scans a single page or crawls a site with a headless browser, runs the
/// rules engine plus a suite of in-browser probes, and reports violations
/// with remediation guidance.
#[derive(Parser, Debug)]
#[command(
    name = "pagesentry",
    version,
    author,
    about = "Headless-browser accessibility, performance and link-health auditor",
    long_about = "pagesentry audits web pages for WCAG 2.1/2.2 A+AA conformance.\n\n\
                  One scan combines the axe-core rules engine with custom probes for:\n\
                  - focus order, traps and modal focus management\n\
                  - skip links, landmarks and heading structure\n\
                  - carousel/media autoplay and zoom restrictions\n\
                  - Core Web Vitals and broken same-host links\n\n\
                  Crawl mode discovers pages via /sitemap.xml (BFS fallback)."
)]
pub struct Args {
    /// URL to audit
    ///
    /// Example: https://example.com
    #[arg(value_name = "URL")]
    pub url: String,

    /// Crawl the whole site instead of scanning one page
    #[arg(short = 'c', long)]
    pub crawl: bool,

    /// Maximum number of pages scanned during a crawl
    #[arg(
        short = 'm',
        long,
        value_name = "NUM",
        env = "CRAWLER_MAX_PAGES",
        default_value = "10"
    )]
    pub max_pages: usize,

    /// Device profile to emulate
    #[arg(
        short = 'd',
        long,
        value_enum,
        env = "SCAN_DEVICE_PROFILE",
        default_value = "desktop"
    )]
    pub device: DeviceProfile,

    /// Output format
    #[arg(short = 'f', long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Output file path (stdout if not specified)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Custom Chrome/Chromium binary path
    ///
    /// Overrides auto-detection. Can also be set via CHROME_PATH env var.
    #[arg(long, value_name = "PATH", env = "CHROME_PATH")]
    pub chrome_path: Option<String>,

    /// Disable sandbox mode (required for Docker/root)
    ///
    /// WARNING: Reduces security. Only use in containerized environments.
    #[arg(long)]
    pub no_sandbox: bool,

    /// Page load timeout in seconds
    #[arg(short = 't', long, default_value = "30", value_name = "SECS")]
    pub timeout: u64,

    /// Skip heavyweight outputs (screenshots, bounding boxes)
    #[arg(long)]
    pub skip_heavy: bool,

    /// Verbose output (show progress and debug info)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Quiet mode (only show errors)
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output (machine-readable)
    #[value(name = "json")]
    Json,
    /// CLI table output (human-readable)
    #[value(name = "table")]
    Table,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}

impl Args {
    /// Validate arguments
    pub fn validate(&self) -> Result<(), String> {
        url::Url::parse(&self.url).map_err(|e| format!("Invalid URL '{}': {}", self.url, e))?;

        if self.max_pages == 0 {
            return Err("--max-pages must be at least 1".to_string());
        }
        if self.max_pages > 500 {
            return Err("--max-pages cannot exceed 500".to_string());
        }
        if self.verbose && self.quiet {
            return Err("Cannot use --verbose and --quiet together".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(url: &str) -> Args {
        Args {
            url: url.to_string(),
            crawl: false,
            max_pages: 10,
            device: DeviceProfile::Desktop,
            format: OutputFormat::Table,
            output: None,
            chrome_path: None,
            no_sandbox: false,
            timeout: 30,
            skip_heavy: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_validate_with_url() {
        assert!(args("https://example.com").validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_url() {
        assert!(args("not-a-valid-url").validate().is_err());
    }

    #[test]
    fn test_validate_zero_max_pages() {
        let mut a = args("https://example.com");
        a.max_pages = 0;
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_validate_verbose_and_quiet() {
        let mut a = args("https://example.com");
        a.verbose = true;
        a.quiet = true;
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Table.to_string(), "table");
    }
}
