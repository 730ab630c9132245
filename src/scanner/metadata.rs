//! Best-effort file metadata: timestamps and document author.
//!
//! Timestamps come from the filesystem and are reported in local time.
//! Authors come from an [`ExtractorRegistry`], a table of
//! [`AuthorExtractor`]s keyed by extension. The default registry knows the
//! Office Open XML formats, which store the author as `dc:creator` in
//! `docProps/core.xml` inside the zip container.
//!
//! # Example
//!
//! ```
//! use fileinventory::scanner::metadata::ExtractorRegistry;
//! use std::path::Path;
//!
//! let mut registry = ExtractorRegistry::with_defaults();
//! assert!(registry.supports(".docx"));
//!
//! registry.register_fn(".txt", |_path: &Path| Ok(Some("Plain Text".to_string())));
//! assert_eq!(
//!     registry.extract(Path::new("notes.txt"), ".txt"),
//!     Some("Plain Text".to_string())
//! );
//! ```

use std::collections::HashMap;
use std::fs::{File, Metadata};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDateTime};
use regex::Regex;

/// Extensions handled by [`OoxmlAuthorExtractor`] in the default registry.
pub const OOXML_EXTENSIONS: &[&str] = &[".docx", ".xlsx", ".xlsm", ".pptx"];

const CORE_PROPERTIES: &str = "docProps/core.xml";

/// Errors raised by author extractors.
#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The container or its metadata part could not be parsed.
    #[error("Failed to read document properties from {path}: {message}")]
    Format {
        /// Path to the document
        path: PathBuf,
        /// Error message
        message: String,
    },
}

/// Reads the author of a document.
///
/// Returning `Ok(None)` means the document simply has no author recorded.
pub trait AuthorExtractor: Send + Sync {
    /// Extract the author of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError`] when the file cannot be read or parsed.
    fn extract(&self, path: &Path) -> Result<Option<String>, ExtractError>;
}

impl<F> AuthorExtractor for F
where
    F: Fn(&Path) -> Result<Option<String>, ExtractError> + Send + Sync,
{
    fn extract(&self, path: &Path) -> Result<Option<String>, ExtractError> {
        self(path)
    }
}

/// Author extractor for Office Open XML documents (`.docx`, `.xlsx`, ...).
#[derive(Debug, Clone, Copy, Default)]
pub struct OoxmlAuthorExtractor;

impl AuthorExtractor for OoxmlAuthorExtractor {
    fn extract(&self, path: &Path) -> Result<Option<String>, ExtractError> {
        let file = File::open(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let format_error = |message: String| ExtractError::Format {
            path: path.to_path_buf(),
            message,
        };

        let mut archive = zip::ZipArchive::new(file).map_err(|e| format_error(e.to_string()))?;
        let mut core = match archive.by_name(CORE_PROPERTIES) {
            Ok(core) => core,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(format_error(e.to_string())),
        };

        let mut xml = String::new();
        core.read_to_string(&mut xml).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(creator_from_core_xml(&xml))
    }
}

fn creator_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?s)<dc:creator[^>]*>(.*?)</dc:creator>").ok())
        .as_ref()
}

/// Pull the `dc:creator` value out of a core properties document.
///
/// Empty or whitespace-only creators count as absent.
#[must_use]
pub fn creator_from_core_xml(xml: &str) -> Option<String> {
    let captures = creator_pattern()?.captures(xml)?;
    let author = unescape_xml(captures.get(1)?.as_str().trim());
    if author.is_empty() {
        None
    } else {
        Some(author)
    }
}

/// Resolve the predefined XML entities and numeric character references.
fn unescape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };

        let entity = &tail[1..end];
        let resolved = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .map(|hex| u32::from_str_radix(hex, 16))
                .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                .and_then(Result::ok)
                .and_then(char::from_u32),
        };

        match resolved {
            Some(c) => out.push(c),
            None => out.push_str(&tail[..=end]),
        }
        rest = &tail[end + 1..];
    }

    out.push_str(rest);
    out
}

/// Author extractors keyed by lowercase, dot-prefixed extension.
///
/// Built once and shared by reference with the scanner.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn AuthorExtractor>>,
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut extensions: Vec<_> = self.extractors.keys().collect();
        extensions.sort();
        f.debug_struct("ExtractorRegistry")
            .field("extensions", &extensions)
            .finish()
    }
}

impl ExtractorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the Office Open XML extractor registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let ooxml: Arc<dyn AuthorExtractor> = Arc::new(OoxmlAuthorExtractor);
        for extension in OOXML_EXTENSIONS {
            registry.register(extension, Arc::clone(&ooxml));
        }
        registry
    }

    /// Register (or replace) the extractor for an extension.
    ///
    /// The extension is normalized the same way as the scan filter, so
    /// `"DOCX"` and `".docx"` are the same key.
    pub fn register(&mut self, extension: &str, extractor: Arc<dyn AuthorExtractor>) {
        let key = normalize_extension(extension);
        log::trace!("Registering author extractor for {}", key);
        self.extractors.insert(key, extractor);
    }

    /// Register a closure as the extractor for an extension.
    pub fn register_fn<F>(&mut self, extension: &str, extractor: F)
    where
        F: Fn(&Path) -> Result<Option<String>, ExtractError> + Send + Sync + 'static,
    {
        self.register(extension, Arc::new(extractor));
    }

    /// Whether an extractor is registered for the extension.
    #[must_use]
    pub fn supports(&self, extension: &str) -> bool {
        self.extractors.contains_key(&normalize_extension(extension))
    }

    /// Number of registered extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Whether no extractor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Run the extractor for `extension` on `path`.
    ///
    /// Unknown extensions and extractor failures both yield `None`; failures
    /// are logged at debug level.
    #[must_use]
    pub fn extract(&self, path: &Path, extension: &str) -> Option<String> {
        let extractor = self.extractors.get(&normalize_extension(extension))?;
        match extractor.extract(path) {
            Ok(author) => author,
            Err(e) => {
                log::debug!("Author extraction failed: {}", e);
                None
            }
        }
    }
}

fn normalize_extension(extension: &str) -> String {
    let lower = extension.trim().to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}

/// Convert a filesystem timestamp to local wall-clock time.
#[must_use]
pub fn to_local_naive(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}

/// Read `(created, modified)` for a file.
///
/// Both are `None` when the file cannot be stat'ed. Where the platform has
/// no birth time, the inode change time stands in for creation on Unix and
/// the modification time elsewhere.
#[must_use]
pub fn file_dates(path: &Path) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
    match std::fs::metadata(path) {
        Ok(metadata) => dates_from_metadata(&metadata),
        Err(e) => {
            log::debug!("Cannot read dates for {}: {}", path.display(), e);
            (None, None)
        }
    }
}

/// Extract `(created, modified)` from already loaded metadata.
#[must_use]
pub fn dates_from_metadata(metadata: &Metadata) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
    let modified = metadata.modified().ok().map(to_local_naive);
    let created = metadata
        .created()
        .ok()
        .map(to_local_naive)
        .or_else(|| change_time(metadata))
        .or(modified);
    (created, modified)
}

#[cfg(unix)]
fn change_time(metadata: &Metadata) -> Option<NaiveDateTime> {
    use std::os::unix::fs::MetadataExt;

    let nanos = u32::try_from(metadata.ctime_nsec()).unwrap_or(0);
    DateTime::from_timestamp(metadata.ctime(), nanos)
        .map(|utc| utc.with_timezone(&Local).naive_local())
}

#[cfg(not(unix))]
fn change_time(_metadata: &Metadata) -> Option<NaiveDateTime> {
    None
}
