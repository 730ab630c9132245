//! Duplicate detector implementation with multi-phase detection.
//!
//! # Overview
//!
//! This module runs the duplicate detection pipeline over a set of
//! inventory rows:
//! 1. **Size grouping**: Group files by current size (see [`crate::duplicates::groups`])
//! 2. **Quick hash**: Hash the first and last 1 KiB plus the size of same-size files
//! 3. **Full hash**: Hash the entire content of quick-hash matches
//!
//! Work proceeds one size group at a time. With `io_threads > 1` the files of
//! a size group are hashed on a bounded rayon pool; results are collected in
//! input order and a group is only merged once its full-hash pass finished,
//! so the outcome is identical to a sequential run.
//!
//! # Example
//!
//! ```no_run
//! use fileinventory::duplicates::{DetectorConfig, DuplicateDetector};
//! use fileinventory::scanner::{DirectoryScanner, ScanOptions};
//! use std::path::Path;
//!
//! let outcome = DirectoryScanner::new(Path::new("."), ScanOptions::default()).scan()?;
//!
//! let mut detector = DuplicateDetector::new(DetectorConfig::default().with_io_threads(4));
//! let groups = detector.find_duplicates(&outcome.records);
//! println!("Found {} duplicate groups", groups.len());
//! println!("{}", detector.render_report());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::groups::{group_by_size, DuplicateGroup, DuplicateStats};
use super::report::{render_report, write_report, ReportError};
use crate::progress::{ProgressCallback, PHASE_HASH};
use crate::scanner::walker::CancelCheck;
use crate::scanner::{FileRecord, Hash, Hasher, HASH_CHUNK_SIZE, QUICK_HASH_SAMPLE};

/// Report progress after this many processed candidates.
pub const PROGRESS_INTERVAL: usize = 10;

/// Configuration for duplicate detection.
#[derive(Clone)]
pub struct DetectorConfig {
    /// Filter same-size files with the quick hash before full hashing.
    pub use_quick_hash: bool,
    /// Number of I/O threads for hashing within a size group.
    /// `1` hashes sequentially on the calling thread.
    pub io_threads: usize,
    /// Read buffer size for full hashes.
    pub chunk_size: usize,
    /// Bytes sampled from each end of a file for the quick hash.
    pub sample_size: usize,
    /// Optional progress callback, called with `(processed, total)`.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
    /// Cancellation predicates, polled before every file.
    pub cancel_checks: Vec<CancelCheck>,
}

impl std::fmt::Debug for DetectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorConfig")
            .field("use_quick_hash", &self.use_quick_hash)
            .field("io_threads", &self.io_threads)
            .field("chunk_size", &self.chunk_size)
            .field("sample_size", &self.sample_size)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .field("cancel_checks", &self.cancel_checks.len())
            .finish()
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            use_quick_hash: true,
            io_threads: 1,
            chunk_size: HASH_CHUNK_SIZE,
            sample_size: QUICK_HASH_SAMPLE,
            progress_callback: None,
            cancel_checks: Vec::new(),
        }
    }
}

impl DetectorConfig {
    /// Enable or disable the quick-hash filter.
    #[must_use]
    pub fn with_quick_hash(mut self, enabled: bool) -> Self {
        self.use_quick_hash = enabled;
        self
    }

    /// Set the number of I/O threads (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the full-hash read buffer size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the quick-hash sample size.
    #[must_use]
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size.max(1);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Add a cancellation predicate.
    #[must_use]
    pub fn with_cancel_check(mut self, check: CancelCheck) -> Self {
        self.cancel_checks.push(check);
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(self, flag: Arc<AtomicBool>) -> Self {
        self.with_cancel_check(Arc::new(move || flag.load(Ordering::SeqCst)))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_checks.iter().any(|check| check())
    }
}

/// Summary of the last detection run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionSummary {
    /// Rows passed in
    pub total_files: usize,
    /// Rows whose file no longer exists
    pub missing_files: usize,
    /// Files in size groups of two or more
    pub candidate_files: usize,
    /// Files quick-hashed
    pub quick_hashed: usize,
    /// Files full-hashed
    pub full_hashed: usize,
    /// Files that could not be hashed and were skipped
    pub failed_files: usize,
    /// Whether cancellation stopped the run early
    pub interrupted: bool,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HashKind {
    Quick,
    Full,
}

#[derive(Debug, Clone, Copy)]
enum HashOutcome {
    Hashed(Hash),
    Failed,
    Skipped,
}

/// Shared progress state for one run.
struct ProgressState<'a> {
    callback: Option<&'a Arc<dyn ProgressCallback>>,
    processed: AtomicUsize,
    total: usize,
}

impl ProgressState<'_> {
    fn advance(&self) {
        let processed = self.processed.fetch_add(1, Ordering::SeqCst) + 1;
        if processed % PROGRESS_INTERVAL == 0 {
            if let Some(callback) = self.callback {
                callback.on_progress(processed, self.total);
            }
        }
    }
}

/// Finds groups of identical files among inventory rows.
///
/// The detector keeps the groups and summary of its last run; every call to
/// [`find_duplicates`](Self::find_duplicates) starts from scratch.
pub struct DuplicateDetector {
    config: DetectorConfig,
    hasher: Hasher,
    pool: Option<rayon::ThreadPool>,
    groups: Vec<DuplicateGroup>,
    summary: DetectionSummary,
}

impl std::fmt::Debug for DuplicateDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateDetector")
            .field("config", &self.config)
            .field("parallel", &self.pool.is_some())
            .field("groups", &self.groups.len())
            .field("summary", &self.summary)
            .finish()
    }
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

impl DuplicateDetector {
    /// Create a new detector with the given configuration.
    ///
    /// If a dedicated thread pool cannot be created, hashing falls back to
    /// the calling thread.
    #[must_use]
    pub fn new(config: DetectorConfig) -> Self {
        let hasher = Hasher::new()
            .with_chunk_size(config.chunk_size)
            .with_sample_size(config.sample_size);

        let pool = if config.io_threads > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(config.io_threads)
                .build()
            {
                Ok(pool) => Some(pool),
                Err(e) => {
                    log::warn!("Failed to create hashing thread pool, hashing sequentially: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            config,
            hasher,
            pool,
            groups: Vec::new(),
            summary: DetectionSummary::default(),
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Groups from the last run.
    #[must_use]
    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    /// Summary of the last run.
    #[must_use]
    pub fn summary(&self) -> &DetectionSummary {
        &self.summary
    }

    /// Statistics over the groups of the last run.
    #[must_use]
    pub fn stats(&self) -> DuplicateStats {
        DuplicateStats::from_groups(&self.groups)
    }

    /// Plain-text report of the last run.
    #[must_use]
    pub fn render_report(&self) -> String {
        render_report(&self.groups)
    }

    /// Write the plain-text report of the last run to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the file cannot be written.
    pub fn export_report(&self, path: &Path) -> Result<(), ReportError> {
        write_report(path, &self.groups)
    }

    /// Find groups of identical files among `records`.
    ///
    /// Files are compared by their content as it is on disk now. Rows whose
    /// file is missing are ignored, files that fail to hash are skipped and
    /// counted in [`DetectionSummary::failed_files`]. When cancelled, the
    /// groups completed so far are kept and
    /// [`DetectionSummary::interrupted`] is set.
    ///
    /// Groups are ordered by member count (largest first), ties by the
    /// input position of their first member.
    pub fn find_duplicates(&mut self, records: &[FileRecord]) -> &[DuplicateGroup] {
        let (groups, summary) = self.detect(records);
        self.groups = groups;
        self.summary = summary;
        &self.groups
    }

    fn detect(&self, records: &[FileRecord]) -> (Vec<DuplicateGroup>, DetectionSummary) {
        let start = Instant::now();
        let (size_groups, grouping) = group_by_size(records);

        let mut summary = DetectionSummary {
            total_files: grouping.total_files,
            missing_files: grouping.missing_files,
            candidate_files: grouping.potential_duplicates,
            ..DetectionSummary::default()
        };

        log::info!(
            "Checking {} candidates in {} size groups for duplicates",
            summary.candidate_files,
            size_groups.len()
        );

        let progress = ProgressState {
            callback: self.config.progress_callback.as_ref(),
            processed: AtomicUsize::new(0),
            total: summary.candidate_files,
        };
        if let Some(callback) = progress.callback {
            callback.on_phase_start(PHASE_HASH, progress.total);
        }

        let mut found: Vec<(usize, DuplicateGroup)> = Vec::new();

        for size_group in &size_groups {
            if self.config.is_cancelled() {
                summary.interrupted = true;
                break;
            }

            let mut full_candidates: Vec<usize> = if self.config.use_quick_hash {
                let quick = self.hash_members(
                    records,
                    &size_group.members,
                    HashKind::Quick,
                    Some(&progress),
                );
                summary.quick_hashed += quick
                    .iter()
                    .filter(|(_, outcome)| !matches!(outcome, HashOutcome::Skipped))
                    .count();
                if tally(&quick, &mut summary) {
                    break;
                }
                bucket_by_hash(&quick)
                    .into_iter()
                    .filter(|(_, members)| members.len() > 1)
                    .flat_map(|(_, members)| members)
                    .collect()
            } else {
                size_group.members.clone()
            };

            if full_candidates.len() < 2 {
                continue;
            }

            let counting = if self.config.use_quick_hash {
                None
            } else {
                Some(&progress)
            };
            full_candidates.sort_unstable();
            let full = self.hash_members(records, &full_candidates, HashKind::Full, counting);
            summary.full_hashed += full
                .iter()
                .filter(|(_, outcome)| !matches!(outcome, HashOutcome::Skipped))
                .count();
            if tally(&full, &mut summary) {
                break;
            }

            for (hash, members) in bucket_by_hash(&full) {
                if members.len() < 2 {
                    continue;
                }
                let first = members[0];
                let files = members.iter().map(|&i| records[i].clone()).collect();
                found.push((first, DuplicateGroup::new(hash, size_group.size, files)));
            }
        }

        found.sort_by_key(|(first, _)| *first);
        let mut groups: Vec<DuplicateGroup> = found.into_iter().map(|(_, group)| group).collect();
        groups.sort_by(|a, b| b.len().cmp(&a.len()));

        if let Some(callback) = progress.callback {
            callback.on_phase_end(PHASE_HASH);
        }

        summary.duration = start.elapsed();
        log::info!(
            "Duplicate detection finished: {} groups, {} failed files{} in {:.2?}",
            groups.len(),
            summary.failed_files,
            if summary.interrupted { " (interrupted)" } else { "" },
            summary.duration
        );

        (groups, summary)
    }

    /// Hash the given rows, returning results in the order of `members`.
    fn hash_members(
        &self,
        records: &[FileRecord],
        members: &[usize],
        kind: HashKind,
        progress: Option<&ProgressState<'_>>,
    ) -> Vec<(usize, HashOutcome)> {
        let work = |&index: &usize| -> (usize, HashOutcome) {
            if self.config.is_cancelled() {
                return (index, HashOutcome::Skipped);
            }

            let path = &records[index].full_path;
            let result = match kind {
                HashKind::Quick => self.hasher.quick_hash(path),
                HashKind::Full => self.hasher.full_hash(path),
            };
            let outcome = match result {
                Ok(hash) => HashOutcome::Hashed(hash),
                Err(e) => {
                    log::warn!("Skipping file that could not be hashed: {}", e);
                    HashOutcome::Failed
                }
            };

            if let Some(progress) = progress {
                progress.advance();
            }
            (index, outcome)
        };

        match self.pool {
            Some(ref pool) => pool.install(|| members.par_iter().map(work).collect()),
            None => members.iter().map(work).collect(),
        }
    }
}

/// Count failures; returns `true` when any file was skipped by cancellation.
fn tally(results: &[(usize, HashOutcome)], summary: &mut DetectionSummary) -> bool {
    for (_, outcome) in results {
        match outcome {
            HashOutcome::Failed => summary.failed_files += 1,
            HashOutcome::Skipped => summary.interrupted = true,
            HashOutcome::Hashed(_) => {}
        }
    }
    summary.interrupted
}

/// Group successfully hashed rows by hash, buckets in order of first
/// appearance, members in input order.
fn bucket_by_hash(results: &[(usize, HashOutcome)]) -> Vec<(Hash, Vec<usize>)> {
    let mut buckets: Vec<(Hash, Vec<usize>)> = Vec::new();
    let mut slots: HashMap<Hash, usize> = HashMap::new();

    for (index, outcome) in results {
        if let HashOutcome::Hashed(hash) = outcome {
            let slot = *slots.entry(*hash).or_insert_with(|| {
                buckets.push((*hash, Vec::new()));
                buckets.len() - 1
            });
            buckets[slot].1.push(*index);
        }
    }

    buckets
}
