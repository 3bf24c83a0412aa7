//! pagesentry - headless-browser accessibility auditor
//!
//! Audits web pages for WCAG 2.1/2.2 A+AA conformance, Core Web Vitals,
//! keyboard navigation, document structure and link health. One scan
//! drives a headless Chrome through a fixed phase sequence; crawl mode
//! discovers pages via the sitemap (BFS fallback) and aggregates the
//! per-page reports.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pagesentry::scan::{ScanOptions, Scanner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let scanner = Scanner::new().await?;
//!
//!     let report = scanner
//!         .scan("https://example.com", &ScanOptions::default())
//!         .await?;
//!
//!     println!("Score: {}", report.score);
//!     println!("Violations: {}", report.stats.total_violations);
//!
//!     scanner.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`browser`]: Chrome session facade and device profiles
//! - [`engine`]: axe-core rules engine adapter
//! - [`probes`]: custom ACT-style probe suite
//! - [`keyboard`]: simulated Tab-walk analyzer
//! - [`perf`]: Core Web Vitals collector
//! - [`links`]: same-host link-health sweeps
//! - [`headings`]: heading outline extraction
//! - [`report`]: report data model, scoring and normalization
//! - [`scan`]: per-page orchestrator
//! - [`crawl`]: sitemap/BFS crawler
//! - [`output`]: JSON and terminal formatters
//! - [`cli`]: command-line interface
//! - [`error`]: error types
//!
//! ## Custom probes
//!
//! | Id | Detects | WCAG |
//! |----|---------|------|
//! | focus-order | traps, visual jumps, modal focus bleed | 2.1.2, 2.4.3 |
//! | landmarks | missing/duplicate landmark regions | 1.3.1 |
//! | skip-link | missing or broken skip link | 2.4.1 |
//! | modal-focus | unmanaged dialogs | 2.4.3 |
//! | carousel-autoplay | auto-advance without pause | 2.2.2 |
//! | meta-viewport | zoom disabled | 1.4.4 |
//! | orientation-lock | CSS-rotated root | 1.3.4 |
//! | autoplay-media | unmuted media past 3 s | 1.4.2 |
//! | form-errors | no error region for required fields | 3.3.1 |
//! | suspicious-alt | filename/placeholder alt texts | 1.1.1 |

pub mod browser;
pub mod cli;
pub mod crawl;
pub mod engine;
pub mod error;
pub mod headings;
pub mod keyboard;
pub mod links;
pub mod output;
pub mod perf;
pub mod probes;
pub mod report;
pub mod scan;

// Re-export commonly used types
pub use browser::{BrowserSession, DeviceProfile, SessionOptions};
pub use crawl::{crawl_site, CrawlOptions};
pub use error::{Result, ScanError};
pub use output::{format_json, load_report_file, print_report, print_summary};
pub use report::{
    ActionItem, AuditReport, CrawlSummary, ReportDocument, Severity, Violation, ViolationNode,
};
pub use scan::{ScanMode, ScanOptions, ScanRequest, Scanner};
