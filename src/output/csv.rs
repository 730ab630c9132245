//! CSV exporter for inventory rows.
//!
//! One header row with the layout's column names, then one row per record.
//! Absent values are written as empty cells.
//!
//! # Example
//!
//! ```
//! use fileinventory::output::CsvExporter;
//! use fileinventory::scanner::{FileRecord, RowLayout};
//!
//! let rows = vec![FileRecord::new("Share", "/data", "a.txt")];
//! let csv = CsvExporter::new().to_string(&rows, &RowLayout::default()).unwrap();
//! assert!(csv.starts_with("RootFolder,FolderString,FullPath,FileName"));
//! ```

use std::io;
use std::path::Path;

use super::{create_file, ExportError, Exporter};
use crate::scanner::{FileRecord, RowLayout};

/// CSV exporter.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl CsvExporter {
    /// Create a new CSV exporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(
        &self,
        records: &[FileRecord],
        layout: &RowLayout,
        writer: W,
    ) -> Result<usize, ExportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(layout.headers())?;

        for record in records {
            let row = record
                .to_fields(layout)
                .into_iter()
                .map(|(_, value)| value.unwrap_or_default());
            csv_writer.write_record(row)?;
        }

        csv_writer.flush().map_err(csv::Error::from)?;
        Ok(records.len())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if serialization fails.
    pub fn to_string(&self, records: &[FileRecord], layout: &RowLayout) -> Result<String, ExportError> {
        let mut buffer = Vec::new();
        self.write_to(records, layout, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

impl Exporter for CsvExporter {
    fn format_name(&self) -> &'static str {
        "csv"
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rows() -> Vec<FileRecord> {
        vec![
            FileRecord::new("Share", "/data/reports", "q1.xlsx")
                .with_folders(vec![Some("Reports".to_string()), None, None]),
            FileRecord::new("Share", "/data", "notes.txt"),
        ]
    }

    #[test]
    fn test_csv_header_and_rows() {
        let layout = RowLayout::default();
        let csv = CsvExporter::new().to_string(&rows(), &layout).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], layout.headers().join(","));
        assert!(lines[1].starts_with("Share,/data/reports,/data/reports/q1.xlsx,q1.xlsx,.xlsx,Spreadsheet,Reports,,"));
    }

    #[test]
    fn test_csv_duplicate_column() {
        let layout = RowLayout::default().with_duplicate_group(true);
        let mut records = rows();
        records[0].duplicate_group = Some("Group 1 (2 files)".to_string());

        let csv = CsvExporter::new().to_string(&records, &layout).unwrap();
        assert!(csv.lines().next().unwrap().ends_with(",DuplicateGroup"));
        assert!(csv.lines().nth(1).unwrap().ends_with(",Group 1 (2 files)"));
    }

    #[test]
    fn test_csv_quoting() {
        let records = vec![FileRecord::new("Share", "/data", "a,b.txt")];
        let csv = CsvExporter::new()
            .to_string(&records, &RowLayout::default())
            .unwrap();
        assert!(csv.contains("\"a,b.txt\""));
    }

    #[test]
    fn test_csv_export_to_file() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.csv");
        let written = CsvExporter::new()
            .export(&rows(), &RowLayout::default(), &dest)
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(std::fs::read_to_string(&dest).unwrap().lines().count(), 3);
    }
}
