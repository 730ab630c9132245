//! Cache entry definitions and the persisted store layout.
//!
//! The store is a single JSON document:
//!
//! ```json
//! {
//!   "cache": {
//!     "/data/share": { "results": [ ... ], "timestamp": 1718000000.5, "file_count": 42 }
//!   },
//!   "history": ["/data/share"]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::scanner::FileRecord;

/// Scan results cached for one directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Records produced by the scan
    pub results: Vec<FileRecord>,
    /// Epoch seconds at which the entry was written
    #[serde(default)]
    pub timestamp: f64,
    /// Number of records, kept alongside for cheap statistics
    #[serde(default)]
    pub file_count: usize,
}

impl CacheEntry {
    /// Create an entry stamped with the given time.
    #[must_use]
    pub fn new(results: Vec<FileRecord>, timestamp: f64) -> Self {
        Self {
            file_count: results.len(),
            results,
            timestamp,
        }
    }

    /// Age of the entry in seconds at `now`.
    #[must_use]
    pub fn age(&self, now: f64) -> f64 {
        now - self.timestamp
    }

    /// Whether the entry is older than `max_age_seconds` at `now`.
    #[must_use]
    pub fn is_expired(&self, now: f64, max_age_seconds: u64) -> bool {
        self.age(now) > max_age_seconds as f64
    }

    /// Whether the directory changed after the entry was written.
    #[must_use]
    pub fn is_stale(&self, directory_mtime: f64) -> bool {
        directory_mtime > self.timestamp
    }
}

/// On-disk layout of the cache file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStore {
    /// Entries keyed by normalized directory path
    #[serde(default)]
    pub cache: BTreeMap<String, CacheEntry>,
    /// Directories in scan order, oldest first, without repeats
    #[serde(default)]
    pub history: Vec<String>,
}

/// Current time as fractional epoch seconds.
#[must_use]
pub fn now_epoch_secs() -> f64 {
    system_time_secs(SystemTime::now())
}

/// Convert a timestamp to fractional epoch seconds (negative before 1970).
#[must_use]
pub fn system_time_secs(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs_f64(),
        Err(before) => -before.duration().as_secs_f64(),
    }
}

/// Modification time of a directory in epoch seconds, if readable.
#[must_use]
pub fn directory_mtime(directory: &Path) -> Option<f64> {
    std::fs::metadata(directory)
        .and_then(|m| m.modified())
        .ok()
        .map(system_time_secs)
}
