//! Progress reporting utilities using indicatif.
//!
//! This module defines the [`ProgressCallback`] trait that the scanner and the
//! duplicate detector report through, and the [`Progress`] struct which
//! implements it with terminal progress bars:
//!
//! - `"scan"`: spinner with a running file count (total unknown)
//! - `"hash"`: bar over the duplicate candidates
//!
//! Plain closures taking `(current, total)` implement the trait as well, which
//! keeps tests and embedding code free of boilerplate.
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use fileinventory::progress::ProgressCallback;
//!
//! let seen = Arc::new(AtomicUsize::new(0));
//! let sink = Arc::clone(&seen);
//! let callback: Arc<dyn ProgressCallback> = Arc::new(move |current: usize, _total: usize| {
//!     sink.store(current, Ordering::SeqCst);
//! });
//!
//! callback.on_progress(42, 0);
//! assert_eq!(seen.load(Ordering::SeqCst), 42);
//! ```

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Phase name reported by the directory scanner.
pub const PHASE_SCAN: &str = "scan";

/// Phase name reported by the duplicate detector.
pub const PHASE_HASH: &str = "hash";

/// Progress callback for long-running phases.
///
/// Implement this trait to receive progress updates during a scan or a
/// duplicate detection run.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ([`PHASE_SCAN`] or [`PHASE_HASH`])
    /// * `total` - Total number of items to process, `0` when unknown
    fn on_phase_start(&self, _phase: &str, _total: usize) {}

    /// Called periodically while a phase runs.
    ///
    /// # Arguments
    ///
    /// * `current` - Items processed so far
    /// * `total` - Total items, `0` when unknown
    fn on_progress(&self, current: usize, total: usize);

    /// Called when a phase completes.
    fn on_phase_end(&self, _phase: &str) {}

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

impl<F> ProgressCallback for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn on_progress(&self, current: usize, total: usize) {
        self(current, total);
    }
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    scanning: Mutex<Option<ProgressBar>>,
    hashing: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use fileinventory::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            scanning: Mutex::new(None),
            hashing: Mutex::new(None),
            quiet,
        }
    }

    fn scanning_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn hashing_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("quiet", &self.quiet)
            .finish_non_exhaustive()
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            PHASE_SCAN => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::scanning_style());
                pb.set_message("Scanning");
                pb.enable_steady_tick(Duration::from_millis(100));
                *self.scanning.lock().unwrap() = Some(pb);
            }
            _ => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::hashing_style());
                pb.set_message("Hashing");
                *self.hashing.lock().unwrap() = Some(pb);
            }
        }
    }

    fn on_progress(&self, current: usize, total: usize) {
        if self.quiet {
            return;
        }

        if let Some(ref pb) = *self.hashing.lock().unwrap() {
            if total as u64 != pb.length().unwrap_or(0) {
                pb.set_length(total as u64);
            }
            pb.set_position(current as u64);
        } else if let Some(ref pb) = *self.scanning.lock().unwrap() {
            pb.set_position(current as u64);
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        match phase {
            PHASE_SCAN => {
                if let Some(pb) = self.scanning.lock().unwrap().take() {
                    pb.finish_with_message("Scan complete");
                }
            }
            _ => {
                if let Some(pb) = self.hashing.lock().unwrap().take() {
                    pb.finish_with_message("Hashing complete");
                }
            }
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }

        if let Some(ref pb) = *self.hashing.lock().unwrap() {
            pb.set_message(message.to_string());
        } else if let Some(ref pb) = *self.scanning.lock().unwrap() {
            pb.set_message(message.to_string());
        }
    }
}
