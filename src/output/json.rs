//! JSON exporter for inventory rows.
//!
//! # Output Schema
//!
//! An array with one object per record, keys in column order, absent values
//! as `null`:
//!
//! ```json
//! [
//!   {
//!     "RootFolder": "Share",
//!     "FolderString": "/data/reports",
//!     "FullPath": "/data/reports/q1.xlsx",
//!     "FileName": "q1.xlsx",
//!     "Extension": ".xlsx",
//!     "FileType": "Spreadsheet",
//!     "Folder1": "Reports",
//!     "Folder2": null,
//!     "Folder3": null,
//!     "DateCreated": "2024-01-02 10:00:00",
//!     "DateModified": "2024-01-05 16:30:00",
//!     "Author": "Jane Doe"
//!   }
//! ]
//! ```

use std::io::Write;
use std::path::Path;

use serde_json::{Map, Value};

use super::{create_file, ExportError, Exporter};
use crate::scanner::{FileRecord, RowLayout};

/// JSON exporter.
#[derive(Debug, Clone, Copy)]
pub struct JsonExporter {
    pretty: bool,
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonExporter {
    /// Create a new exporter producing pretty-printed output.
    #[must_use]
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Choose between pretty-printed and compact output.
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Build the JSON value for `records`.
    #[must_use]
    pub fn to_value(&self, records: &[FileRecord], layout: &RowLayout) -> Value {
        Value::Array(
            records
                .iter()
                .map(|record| {
                    let object: Map<String, Value> = record
                        .to_fields(layout)
                        .into_iter()
                        .map(|(key, value)| (key, value.map_or(Value::Null, Value::String)))
                        .collect();
                    Value::Object(object)
                })
                .collect(),
        )
    }

    /// Serialize `records` to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self, records: &[FileRecord], layout: &RowLayout) -> Result<String, serde_json::Error> {
        let value = self.to_value(records, layout);
        if self.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        }
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(
        &self,
        records: &[FileRecord],
        layout: &RowLayout,
        mut writer: W,
    ) -> Result<usize, ExportError> {
        let value = self.to_value(records, layout);
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, &value)?;
        } else {
            serde_json::to_writer(&mut writer, &value)?;
        }
        writer.flush().map_err(serde_json::Error::io)?;
        Ok(records.len())
    }
}

impl Exporter for JsonExporter {
    fn format_name(&self) -> &'static str {
        "json"
    }

    fn export(
        &self,
        records: &[FileRecord],
        layout: &RowLayout,
        dest: &Path,
    ) -> Result<usize, ExportError> {
        let written = self.write_to(records, layout, create_file(dest)?)?;
        log::info!("Exported {} rows to {}", written, dest.display());
        Ok(written)
    }
}
