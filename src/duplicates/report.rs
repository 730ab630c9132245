//! Plain-text duplicate report.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::groups::{DuplicateGroup, DuplicateStats};

const RULE_WIDTH: usize = 80;
const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Error writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Format a byte count with two decimals, stepping units by 1024.
///
/// ```
/// use fileinventory::duplicates::format_size;
///
/// assert_eq!(format_size(512.0), "512.00 B");
/// assert_eq!(format_size(1536.0), "1.50 KB");
/// ```
#[must_use]
pub fn format_size(bytes: f64) -> String {
    let mut value = bytes;
    for unit in SIZE_UNITS {
        if value < 1024.0 {
            return format!("{value:.2} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.2} PB")
}

/// Render the report for `groups`, in the order given.
#[must_use]
pub fn render_report(groups: &[DuplicateGroup]) -> String {
    let stats = DuplicateStats::from_groups(groups);
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);

    let mut lines = vec![
        "DUPLICATE FILE REPORT".to_string(),
        heavy.clone(),
        String::new(),
        format!("Duplicate Groups: {}", stats.group_count),
        format!("Duplicate Files: {}", stats.duplicate_file_count),
        format!("Wasted Space: {}", format_size(stats.wasted_bytes as f64)),
        format!("Largest Group: {} files", stats.largest_group_size),
        String::new(),
        heavy,
        String::new(),
    ];

    for (i, group) in groups.iter().enumerate() {
        lines.push(format!("Group {}: {} duplicates", i + 1, group.len()));
        lines.push(format!("Hash: {}", group.hash_hex()));
        lines.push(format!("Total Size: {}", format_size(group.total_size as f64)));
        lines.push(format!("Wasted Space: {}", format_size(group.wasted_space())));
        lines.push(String::new());
        for path in group.paths() {
            lines.push(format!("  - {}", path.display()));
        }
        lines.push(String::new());
        lines.push(light.clone());
        lines.push(String::new());
    }

    let mut report = lines.join("\n");
    report.push('\n');
    report
}

/// Write the report for `groups` to `path` as UTF-8.
///
/// # Errors
///
/// Returns [`ReportError::Io`] if the file cannot be written.
pub fn write_report(path: &Path, groups: &[DuplicateGroup]) -> Result<(), ReportError> {
    std::fs::write(path, render_report(groups)).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Duplicate report written to {}", path.display());
    Ok(())
}
