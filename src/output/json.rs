//! JSON output formatter and report-file loader

use std::path::Path;

use serde::Serialize;

use crate::error::{Result, ScanError};
use crate::report::{from_json_value, ReportDocument};

/// Serialize a report (or crawl summary) to JSON
pub fn format_json<T: Serialize>(report: &T, pretty: bool) -> Result<String> {
    let output = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    };
    output.map_err(|e| ScanError::Output {
        reason: format!("JSON serialization failed: {}", e),
    })
}

/// Write a report to a file as pretty-printed JSON
pub fn write_report_file<T: Serialize>(report: &T, path: &Path) -> Result<()> {
    let json = format_json(report, true)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load a report file, accepting the documented legacy shapes
pub fn load_report_file(path: &Path) -> Result<ReportDocument> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    from_json_value(value)
}
