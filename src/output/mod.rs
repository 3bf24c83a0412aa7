//! Output formatting module
//!
//! JSON serialization plus the human-readable terminal report.

mod cli;
mod json;

pub use cli::{print_report, print_summary};
pub use json::{format_json, load_report_file, write_report_file};
