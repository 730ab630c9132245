//! Exporters for inventory rows.
//!
//! This module provides different output formats for the row-set:
//! - CSV for spreadsheet import
//! - JSON for automation and scripting
//!
//! Every exporter consumes the named-field view of each record
//! ([`FileRecord::to_fields`]) so column names and order are shared across
//! formats.
//!
//! # Example
//!
//! ```no_run
//! use fileinventory::output::{CsvExporter, Exporter};
//! use fileinventory::scanner::{DirectoryScanner, RowLayout, ScanOptions};
//! use std::path::Path;
//!
//! let options = ScanOptions::default();
//! let layout = RowLayout::from_options(&options);
//! let outcome = DirectoryScanner::new(Path::new("."), options).scan()?;
//!
//! let written = CsvExporter::new().export(&outcome.records, &layout, Path::new("inventory.csv"))?;
//! println!("Wrote {written} rows");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod csv;
pub mod json;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::scanner::{FileRecord, RowLayout};

pub use self::csv::CsvExporter;
pub use self::json::JsonExporter;

/// Errors that can occur while exporting rows.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The destination could not be created or written.
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// Error during JSON serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes a row-set to a destination file.
pub trait Exporter {
    /// Short format name, also the default file extension.
    fn format_name(&self) -> &'static str;

    /// Write `records` with the columns of `layout` to `dest`.
    ///
    /// Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the file cannot be created or written.
    fn export(
        &self,
        records: &[FileRecord],
        layout: &RowLayout,
        dest: &Path,
    ) -> Result<usize, ExportError>;
}

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// Array of objects
    Json,
}

impl ExportFormat {
    /// Exporter for this format.
    #[must_use]
    pub fn exporter(self) -> Box<dyn Exporter> {
        match self {
            ExportFormat::Csv => Box::new(CsvExporter::new()),
            ExportFormat::Json => Box::new(JsonExporter::new()),
        }
    }

    /// File extension, without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Open `dest` for buffered writing.
pub(crate) fn create_file(dest: &Path) -> Result<BufWriter<File>, ExportError> {
    File::create(dest)
        .map(BufWriter::new)
        .map_err(|source| ExportError::Io {
            path: dest.to_path_buf(),
            source,
        })
}
