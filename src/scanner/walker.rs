//! Directory scanner implementation using walkdir for sequential traversal.
//!
//! # Overview
//!
//! This module provides the [`DirectoryScanner`] struct which walks a
//! directory tree and turns every matching file into a [`FileRecord`].
//! The walk is sequential and sorted by file name, so two scans of an
//! unchanged tree produce identical rows in identical order.
//!
//! # Features
//!
//! - Case-insensitive extension filtering
//! - Folder segments relative to the scan root, optionally title-cased
//! - Best-effort dates and author extraction
//! - Cooperative cancellation, checked before every directory and file
//! - Network mode: throttled walking, denser progress, and a transport
//!   failure once too many entries fail in a row
//!
//! # Example
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//! use fileinventory::scanner::{DirectoryScanner, ScanOptions};
//! use std::path::Path;
//!
//! let shutdown = Arc::new(AtomicBool::new(false));
//! let scanner = DirectoryScanner::new(Path::new("/data/share"), ScanOptions::default())
//!     .with_shutdown_flag(Arc::clone(&shutdown));
//!
//! let outcome = scanner.scan()?;
//! println!("{} files (cancelled: {})", outcome.records.len(), outcome.cancelled);
//! # Ok::<(), fileinventory::scanner::ScanError>(())
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use walkdir::WalkDir;

use super::classify::{
    extension_matches, file_extension, folder_slots, parse_folder_structure, root_folder_name,
};
use super::metadata::{file_dates, ExtractorRegistry};
use super::path_utils::is_network_path;
use super::{FileRecord, NetworkMode, ScanError, ScanOptions, ScanOutcome};
use crate::progress::{ProgressCallback, PHASE_SCAN};

/// Polled cancellation predicate.
pub type CancelCheck = Arc<dyn Fn() -> bool + Send + Sync>;

/// Progress batch size on local storage.
pub const LOCAL_PROGRESS_BATCH: usize = 100;

/// Progress batch size in network mode.
pub const NETWORK_PROGRESS_BATCH: usize = 50;

/// In network mode, pause after this many files.
pub const NETWORK_THROTTLE_EVERY: usize = 10;

/// Length of the network-mode pause.
pub const NETWORK_THROTTLE_DELAY: Duration = Duration::from_millis(10);

/// Consecutive walk errors that abort a network scan.
pub const MAX_CONSECUTIVE_ERRORS: usize = 10;

/// Counts walk errors since the last successfully visited file.
#[derive(Debug, Clone, Copy)]
struct ErrorStreak {
    consecutive: usize,
    limit: usize,
}

impl ErrorStreak {
    fn new(limit: usize) -> Self {
        Self {
            consecutive: 0,
            limit,
        }
    }

    /// Record an error; returns `true` once the limit is reached.
    fn record_error(&mut self) -> bool {
        self.consecutive += 1;
        self.consecutive >= self.limit
    }

    fn reset(&mut self) {
        self.consecutive = 0;
    }
}

/// Sequential directory scanner producing [`FileRecord`]s.
pub struct DirectoryScanner {
    /// Root directory to scan
    root: PathBuf,
    /// Scan options
    options: ScanOptions,
    /// Optional progress reporter
    progress_callback: Option<Arc<dyn ProgressCallback>>,
    /// Cancellation predicates; any returning `true` stops the walk
    cancel_checks: Vec<CancelCheck>,
    /// Author extractors keyed by extension
    extractors: Arc<ExtractorRegistry>,
}

impl std::fmt::Debug for DirectoryScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryScanner")
            .field("root", &self.root)
            .field("options", &self.options)
            .field("has_progress_callback", &self.progress_callback.is_some())
            .field("cancel_checks", &self.cancel_checks.len())
            .field("extractors", &self.extractors)
            .finish()
    }
}

impl DirectoryScanner {
    /// Create a new scanner for the given root.
    ///
    /// # Arguments
    ///
    /// * `root` - Directory to scan
    /// * `options` - Scan options
    ///
    /// # Example
    ///
    /// ```no_run
    /// use fileinventory::scanner::{DirectoryScanner, ScanOptions};
    /// use std::path::Path;
    ///
    /// let scanner = DirectoryScanner::new(Path::new("."), ScanOptions::default());
    /// ```
    #[must_use]
    pub fn new(root: &Path, options: ScanOptions) -> Self {
        Self {
            root: root.to_path_buf(),
            options,
            progress_callback: None,
            cancel_checks: Vec::new(),
            extractors: Arc::new(ExtractorRegistry::with_defaults()),
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Add a cancellation predicate, polled before every directory and file.
    #[must_use]
    pub fn with_cancel_check(mut self, check: CancelCheck) -> Self {
        self.cancel_checks.push(check);
        self
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the scan stops at the next directory
    /// or file and returns what it has collected so far.
    #[must_use]
    pub fn with_shutdown_flag(self, flag: Arc<AtomicBool>) -> Self {
        self.with_cancel_check(Arc::new(move || flag.load(Ordering::SeqCst)))
    }

    /// Replace the author extractor registry.
    #[must_use]
    pub fn with_extractors(mut self, extractors: Arc<ExtractorRegistry>) -> Self {
        self.extractors = extractors;
        self
    }

    /// Root directory of this scanner.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan options of this scanner.
    #[must_use]
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_checks.iter().any(|check| check())
    }

    /// Whether the scan of this root runs in network mode.
    #[must_use]
    pub fn uses_network_mode(&self) -> bool {
        match self.options.network_mode {
            NetworkMode::Auto => is_network_path(&self.root),
            NetworkMode::Local => false,
            NetworkMode::Remote => true,
        }
    }

    fn validate_root(&self) -> Result<(), ScanError> {
        match std::fs::metadata(&self.root) {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(ScanError::NotADirectory(self.root.clone())),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ScanError::NotFound(self.root.clone())),
            Err(e) => Err(ScanError::Io {
                path: self.root.clone(),
                source: e,
            }),
        }
    }

    fn report_progress(&self, count: usize) {
        if let Some(ref callback) = self.progress_callback {
            callback.on_progress(count, 0);
        }
    }

    /// Walk the tree and collect records.
    ///
    /// Cancellation is a normal outcome: the records gathered so far are
    /// returned with [`ScanOutcome::cancelled`] set.
    ///
    /// # Errors
    ///
    /// - [`ScanError::NotFound`] / [`ScanError::NotADirectory`] for a bad root
    /// - [`ScanError::TransportFailure`] when a network scan hits
    ///   [`MAX_CONSECUTIVE_ERRORS`] walk errors in a row
    pub fn scan(&self) -> Result<ScanOutcome, ScanError> {
        self.validate_root()?;

        let network = self.uses_network_mode();
        let batch = if network {
            NETWORK_PROGRESS_BATCH
        } else {
            LOCAL_PROGRESS_BATCH
        };
        let root_label = self
            .options
            .root_label
            .clone()
            .unwrap_or_else(|| root_folder_name(&self.root));

        log::info!(
            "Scanning {} (network mode: {}, filter: {:?})",
            self.root.display(),
            network,
            self.options.extension_filter
        );
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(PHASE_SCAN, 0);
        }

        let mut outcome = ScanOutcome {
            network_mode_used: network,
            ..ScanOutcome::default()
        };
        let mut streak = ErrorStreak::new(MAX_CONSECUTIVE_ERRORS);
        let mut visited_files = 0usize;
        let mut current_dir: Option<(PathBuf, Vec<Option<String>>)> = None;

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map_or_else(|| self.root.clone(), Path::to_path_buf);
                    outcome.skipped_entries += 1;
                    if network {
                        log::debug!("Walk error on network path {}: {}", path.display(), e);
                        if streak.record_error() {
                            log::error!(
                                "Aborting scan of {}: {} consecutive errors",
                                self.root.display(),
                                streak.consecutive
                            );
                            return Err(ScanError::TransportFailure {
                                path,
                                consecutive_errors: streak.consecutive,
                            });
                        }
                    } else {
                        log::warn!("Skipping {}: {}", path.display(), e);
                    }
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                if self.is_cancelled() {
                    log::debug!("Scanner: cancellation requested, stopping walk");
                    outcome.cancelled = true;
                    break;
                }
                continue;
            }

            let path = entry.path();
            if file_type.is_symlink() && path.is_dir() {
                log::trace!("Not following directory symlink: {}", path.display());
                continue;
            }

            if self.is_cancelled() {
                log::debug!("Scanner: cancellation requested, stopping walk");
                outcome.cancelled = true;
                break;
            }

            streak.reset();
            visited_files += 1;
            if network && visited_files % NETWORK_THROTTLE_EVERY == 0 {
                std::thread::sleep(NETWORK_THROTTLE_DELAY);
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !self.options.extension_filter.is_empty()
                && !extension_matches(&file_extension(&file_name), &self.options.extension_filter)
            {
                log::trace!("Skipping file due to extension filter: {}", path.display());
                continue;
            }

            let folder_path = path.parent().map_or_else(|| self.root.clone(), Path::to_path_buf);
            let cached = current_dir
                .as_ref()
                .filter(|(dir, _)| *dir == folder_path)
                .map(|(_, slots)| slots.clone());
            let folders = match cached {
                Some(slots) => slots,
                None => {
                    let segments =
                        parse_folder_structure(&folder_path, &self.root, self.options.title_case);
                    let slots = folder_slots(&segments, self.options.folder_column_count);
                    current_dir = Some((folder_path.clone(), slots.clone()));
                    slots
                }
            };

            let record = self.build_record(&root_label, folder_path, file_name, folders);
            outcome.records.push(record);

            let count = outcome.records.len();
            if count % batch == 0 {
                self.report_progress(count);
            }
        }

        let count = outcome.records.len();
        if count > 0 {
            self.report_progress(count);
        }
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(PHASE_SCAN);
        }

        log::info!(
            "Scan of {} finished: {} files, {} skipped entries{}",
            self.root.display(),
            count,
            outcome.skipped_entries,
            if outcome.cancelled { " (cancelled)" } else { "" }
        );

        Ok(outcome)
    }

    fn build_record(
        &self,
        root_label: &str,
        folder_path: PathBuf,
        file_name: String,
        folders: Vec<Option<String>>,
    ) -> FileRecord {
        let mut record = FileRecord::new(root_label, folder_path, file_name).with_folders(folders);

        if self.options.include_dates {
            let (created, modified) = file_dates(&record.full_path);
            record.created = created;
            record.modified = modified;
        }
        if self.options.include_author {
            record.author = self.extractors.extract(&record.full_path, &record.extension);
        }

        record
    }
}
