//! Scanner module for directory traversal and file classification.
//!
//! This module provides functionality for:
//! - Sequential, cancellable directory walking using walkdir
//! - Per-file rows ([`FileRecord`]) with folder segments, dates and author
//! - Content hashing with BLAKE3
//! - Unicode and lexical path normalization
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and record building
//! - [`classify`]: Extension, category and folder-segment parsing
//! - [`metadata`]: Best-effort dates and author extraction
//! - [`hasher`]: BLAKE3 file hashing (quick sample and streaming)
//! - [`path_utils`]: Cache-key normalization and network path detection
//!
//! # Example
//!
//! ```no_run
//! use fileinventory::scanner::{DirectoryScanner, ScanOptions};
//! use std::path::Path;
//!
//! let options = ScanOptions {
//!     folder_column_count: 2,
//!     extension_filter: vec![".pdf".to_string()],
//!     ..Default::default()
//! };
//!
//! let outcome = DirectoryScanner::new(Path::new("/data/share"), options).scan()?;
//! for record in &outcome.records {
//!     println!("{} ({})", record.full_path.display(), record.file_type);
//! }
//! # Ok::<(), fileinventory::scanner::ScanError>(())
//! ```

pub mod classify;
pub mod hasher;
pub mod metadata;
pub mod path_utils;
pub mod walker;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use hasher::{hash_to_hex, Hash, Hasher, HASH_CHUNK_SIZE, QUICK_HASH_SAMPLE};
pub use metadata::{AuthorExtractor, ExtractError, ExtractorRegistry, OoxmlAuthorExtractor};
pub use walker::DirectoryScanner;

/// Column name of the root label.
pub const COL_ROOT_FOLDER: &str = "RootFolder";
/// Column name of the containing directory.
pub const COL_FOLDER_STRING: &str = "FolderString";
/// Column name of the absolute file path.
pub const COL_FULL_PATH: &str = "FullPath";
/// Column name of the file name.
pub const COL_FILE_NAME: &str = "FileName";
/// Column name of the extension.
pub const COL_EXTENSION: &str = "Extension";
/// Column name of the category.
pub const COL_FILE_TYPE: &str = "FileType";
/// Column name of the creation date.
pub const COL_DATE_CREATED: &str = "DateCreated";
/// Column name of the modification date.
pub const COL_DATE_MODIFIED: &str = "DateModified";
/// Column name of the author.
pub const COL_AUTHOR: &str = "Author";
/// Column name of the duplicate annotation.
pub const COL_DUPLICATE_GROUP: &str = "DuplicateGroup";

/// Timestamp format used for date columns (local time).
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Name of the `index`-th (1-based) folder column.
#[must_use]
pub fn folder_column_name(index: usize) -> String {
    format!("Folder{index}")
}

/// One row of the inventory: a single file and what is known about it.
///
/// Invariant: `full_path == folder_path.join(&file_name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct FileRecord {
    /// Label for the scan root
    pub root_label: String,
    /// Containing directory
    pub folder_path: PathBuf,
    /// Absolute path to the file
    pub full_path: PathBuf,
    /// File name including extension
    pub file_name: String,
    /// Lowercase, dot-prefixed extension (empty when none)
    pub extension: String,
    /// Category label derived from the extension
    pub file_type: String,
    /// Folder segments relative to the scan root, one slot per folder column
    pub folders: Vec<Option<String>>,
    /// Creation time (local)
    pub created: Option<NaiveDateTime>,
    /// Last modification time (local)
    pub modified: Option<NaiveDateTime>,
    /// Document author, when an extractor found one
    pub author: Option<String>,
    /// `"Unique"` or `"Group <n> (<count> files)"` after duplicate detection
    pub duplicate_group: Option<String>,
}

impl FileRecord {
    /// Create a record for `file_name` inside `folder_path`.
    ///
    /// Extension and category are derived from the name; folders, dates and
    /// author start empty.
    #[must_use]
    pub fn new(
        root_label: impl Into<String>,
        folder_path: impl Into<PathBuf>,
        file_name: impl Into<String>,
    ) -> Self {
        let folder_path = folder_path.into();
        let file_name = file_name.into();
        let extension = classify::file_extension(&file_name);
        let file_type = classify::file_type_category(&extension).to_string();

        Self {
            root_label: root_label.into(),
            full_path: folder_path.join(&file_name),
            folder_path,
            file_name,
            extension,
            file_type,
            folders: Vec::new(),
            created: None,
            modified: None,
            author: None,
            duplicate_group: None,
        }
    }

    /// Set the folder slots.
    #[must_use]
    pub fn with_folders(mut self, folders: Vec<Option<String>>) -> Self {
        self.folders = folders;
        self
    }

    /// Named-field view of the record in column order.
    ///
    /// Folder columns are padded with `None` (or truncated) to
    /// `layout.folder_columns`. Absent values are `None`.
    #[must_use]
    pub fn to_fields(&self, layout: &RowLayout) -> Vec<(String, Option<String>)> {
        let mut fields = vec![
            (COL_ROOT_FOLDER.to_string(), Some(self.root_label.clone())),
            (
                COL_FOLDER_STRING.to_string(),
                Some(self.folder_path.display().to_string()),
            ),
            (
                COL_FULL_PATH.to_string(),
                Some(self.full_path.display().to_string()),
            ),
            (COL_FILE_NAME.to_string(), Some(self.file_name.clone())),
            (COL_EXTENSION.to_string(), Some(self.extension.clone())),
            (COL_FILE_TYPE.to_string(), Some(self.file_type.clone())),
        ];

        for i in 0..layout.folder_columns {
            fields.push((
                folder_column_name(i + 1),
                self.folders.get(i).cloned().flatten(),
            ));
        }

        if layout.include_dates {
            fields.push((COL_DATE_CREATED.to_string(), format_date(self.created)));
            fields.push((COL_DATE_MODIFIED.to_string(), format_date(self.modified)));
        }
        if layout.include_author {
            fields.push((COL_AUTHOR.to_string(), self.author.clone()));
        }
        if layout.include_duplicate_group {
            fields.push((COL_DUPLICATE_GROUP.to_string(), self.duplicate_group.clone()));
        }

        fields
    }

    /// Layout that keeps every column this record carries.
    fn persisted_layout(&self) -> RowLayout {
        RowLayout {
            folder_columns: self.folders.len(),
            include_dates: true,
            include_author: true,
            include_duplicate_group: self.duplicate_group.is_some(),
        }
    }
}

fn format_date(date: Option<NaiveDateTime>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

fn parse_date(value: Option<String>) -> Option<NaiveDateTime> {
    let value = value?;
    match NaiveDateTime::parse_from_str(&value, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            log::debug!("Ignoring unparsable date '{}': {}", value, e);
            None
        }
    }
}

/// Errors raised when a persisted row cannot be turned back into a record.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A required column is missing or null.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

impl From<FileRecord> for Map<String, Value> {
    fn from(record: FileRecord) -> Self {
        let layout = record.persisted_layout();
        record
            .to_fields(&layout)
            .into_iter()
            .map(|(key, value)| (key, value.map_or(Value::Null, Value::String)))
            .collect()
    }
}

impl TryFrom<Map<String, Value>> for FileRecord {
    type Error = RecordError;

    fn try_from(mut map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut take = |key: &str| take_string(&mut map, key);

        let full_path = take(COL_FULL_PATH)
            .map(PathBuf::from)
            .ok_or(RecordError::MissingField(COL_FULL_PATH))?;
        let file_name = take(COL_FILE_NAME)
            .or_else(|| {
                full_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .ok_or(RecordError::MissingField(COL_FILE_NAME))?;
        let folder_path = take(COL_FOLDER_STRING)
            .map(PathBuf::from)
            .or_else(|| full_path.parent().map(Path::to_path_buf))
            .unwrap_or_default();

        // Older rows carry no Extension/FileType columns.
        let extension = take(COL_EXTENSION).unwrap_or_else(|| classify::file_extension(&file_name));
        let file_type = take(COL_FILE_TYPE)
            .unwrap_or_else(|| classify::file_type_category(&extension).to_string());

        let root_label = take(COL_ROOT_FOLDER).unwrap_or_default();
        let created = parse_date(take(COL_DATE_CREATED));
        let modified = parse_date(take(COL_DATE_MODIFIED));
        let author = take(COL_AUTHOR);
        let duplicate_group = take(COL_DUPLICATE_GROUP);

        let mut folders = Vec::new();
        loop {
            let key = folder_column_name(folders.len() + 1);
            if !map.contains_key(&key) {
                break;
            }
            folders.push(take_string(&mut map, &key));
        }

        Ok(Self {
            root_label,
            folder_path,
            full_path,
            file_name,
            extension,
            file_type,
            folders,
            created,
            modified,
            author,
            duplicate_group,
        })
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Which columns an export carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    /// Number of `FolderN` columns
    pub folder_columns: usize,
    /// Include `DateCreated` and `DateModified`
    pub include_dates: bool,
    /// Include `Author`
    pub include_author: bool,
    /// Include `DuplicateGroup`
    pub include_duplicate_group: bool,
}

impl Default for RowLayout {
    fn default() -> Self {
        Self::from_options(&ScanOptions::default())
    }
}

impl RowLayout {
    /// Layout matching the columns a scan with `options` produces.
    #[must_use]
    pub fn from_options(options: &ScanOptions) -> Self {
        Self {
            folder_columns: options.folder_column_count,
            include_dates: options.include_dates,
            include_author: options.include_author,
            include_duplicate_group: false,
        }
    }

    /// Enable or disable the `DuplicateGroup` column.
    #[must_use]
    pub fn with_duplicate_group(mut self, enabled: bool) -> Self {
        self.include_duplicate_group = enabled;
        self
    }

    /// Column names in export order.
    #[must_use]
    pub fn headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = [
            COL_ROOT_FOLDER,
            COL_FOLDER_STRING,
            COL_FULL_PATH,
            COL_FILE_NAME,
            COL_EXTENSION,
            COL_FILE_TYPE,
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect();

        headers.extend((1..=self.folder_columns).map(folder_column_name));
        if self.include_dates {
            headers.push(COL_DATE_CREATED.to_string());
            headers.push(COL_DATE_MODIFIED.to_string());
        }
        if self.include_author {
            headers.push(COL_AUTHOR.to_string());
        }
        if self.include_duplicate_group {
            headers.push(COL_DUPLICATE_GROUP.to_string());
        }
        headers
    }
}

/// How the scanner treats the root with respect to remote storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkMode {
    /// Detect from the root path (UNC prefix)
    #[default]
    Auto,
    /// Always treat as local storage
    Local,
    /// Always treat as remote storage (throttled, transport-failure aware)
    Remote,
}

/// Configuration for a directory scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Label for the `RootFolder` column; defaults to the root's folder name.
    pub root_label: Option<String>,
    /// Number of folder slots per record.
    pub folder_column_count: usize,
    /// Title-case folder segments.
    pub title_case: bool,
    /// Normalized extension filter (see [`classify::parse_extensions`]).
    /// Empty means all files.
    pub extension_filter: Vec<String>,
    /// Read creation and modification dates.
    pub include_dates: bool,
    /// Run author extractors.
    pub include_author: bool,
    /// Network handling.
    pub network_mode: NetworkMode,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            root_label: None,
            folder_column_count: 3,
            title_case: true,
            extension_filter: Vec::new(),
            include_dates: true,
            include_author: true,
            network_mode: NetworkMode::Auto,
        }
    }
}

/// Result of a completed (or cancelled) scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Records in walk order
    pub records: Vec<FileRecord>,
    /// Whether the cancel check stopped the walk early
    pub cancelled: bool,
    /// Entries that could not be read and were skipped
    pub skipped_entries: usize,
    /// Whether network throttling was active
    pub network_mode_used: bool,
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Too many consecutive errors while walking a remote share.
    #[error("Network connection lost while scanning {path} ({consecutive_errors} consecutive errors)")]
    TransportFailure {
        /// Path of the last failing entry
        path: PathBuf,
        /// Number of errors in a row
        consecutive_errors: usize,
    },

    /// An I/O error occurred while accessing the root.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised for `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}
