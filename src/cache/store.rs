//! JSON-backed scan result cache.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use super::entry::{directory_mtime, now_epoch_secs, CacheEntry, CacheStore};
use crate::scanner::path_utils::normalize_dir_key;
use crate::scanner::FileRecord;

/// Default number of cached directories.
pub const DEFAULT_MAX_ENTRIES: usize = 10;

/// Default maximum entry age: seven days.
pub const DEFAULT_MAX_AGE_SECONDS: u64 = 7 * 24 * 60 * 60;

/// File name of the cache store inside the cache directory.
pub const CACHE_FILE_NAME: &str = "scan_cache.json";

/// Errors that can occur while persisting the cache.
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    /// Reading or writing the store failed.
    #[error("Cache I/O error for {path}: {source}")]
    Io {
        /// Path of the store
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The store could not be serialized.
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Capacity and age limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Maximum number of cached directories (0 disables storing)
    pub max_entries: usize,
    /// Entries older than this are discarded
    pub max_age_seconds: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_age_seconds: DEFAULT_MAX_AGE_SECONDS,
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    /// Number of cached directories
    pub cached_dir_count: usize,
    /// Sum of `file_count` over all entries
    pub total_cached_files: usize,
    /// Length of the scan history
    pub history_size: usize,
    /// Most frequently scanned directory
    pub most_scanned_dir: Option<String>,
    /// Size of the store on disk
    pub store_size_bytes: u64,
}

/// Bounded, time-boxed scan cache keyed by normalized directory path.
///
/// Single-process: concurrent instances over the same file overwrite each
/// other's writes.
#[derive(Debug)]
pub struct ScanCache {
    path: Option<PathBuf>,
    settings: CacheSettings,
    store: CacheStore,
}

impl ScanCache {
    /// Open the cache stored at `path`.
    ///
    /// A missing, unreadable or corrupt store yields an empty cache; the
    /// problem is logged and the next write replaces the file. Expired
    /// entries are dropped on load.
    #[must_use]
    pub fn open(path: &Path, settings: CacheSettings) -> Self {
        let store = match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<CacheStore>(&content) {
                Ok(store) => store,
                Err(e) => {
                    log::warn!("Ignoring corrupt scan cache {}: {}", path.display(), e);
                    CacheStore::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No scan cache at {}", path.display());
                CacheStore::default()
            }
            Err(e) => {
                log::warn!("Cannot read scan cache {}: {}", path.display(), e);
                CacheStore::default()
            }
        };

        let mut cache = Self {
            path: Some(path.to_path_buf()),
            settings,
            store,
        };
        cache.clean_expired();
        log::debug!(
            "Loaded scan cache {} ({} directories)",
            path.display(),
            cache.store.cache.len()
        );
        cache
    }

    /// Create a cache that is never written to disk.
    #[must_use]
    pub fn in_memory(settings: CacheSettings) -> Self {
        Self {
            path: None,
            settings,
            store: CacheStore::default(),
        }
    }

    /// Default store location in the platform cache directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "fileinventory", "fileinventory")
            .map(|dirs| dirs.cache_dir().join(CACHE_FILE_NAME))
    }

    /// Store location, `None` for in-memory caches.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Active limits.
    #[must_use]
    pub fn settings(&self) -> CacheSettings {
        self.settings
    }

    /// Number of cached directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.cache.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.cache.is_empty()
    }

    /// Scan history, oldest first.
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.store.history
    }

    fn clean_expired(&mut self) {
        let now = now_epoch_secs();
        let max_age = self.settings.max_age_seconds;
        let expired: Vec<String> = self
            .store
            .cache
            .iter()
            .filter(|(_, entry)| entry.is_expired(now, max_age))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            log::debug!("Dropping expired cache entry for {}", key);
            self.store.cache.remove(key);
        }
        self.store.history.retain(|key| !expired.contains(key));
    }

    /// Cached records for `directory`, if present and still valid.
    ///
    /// Entries past the maximum age, or whose directory was modified after
    /// they were written, are evicted. When the directory's mtime cannot be
    /// read the entry is served as-is. Evictions here are not persisted and
    /// history is left untouched.
    pub fn get(&mut self, directory: &Path) -> Option<Vec<FileRecord>> {
        let key = normalize_dir_key(directory);
        let entry = self.store.cache.get(&key)?;

        if entry.is_expired(now_epoch_secs(), self.settings.max_age_seconds) {
            log::debug!("Cache entry for {} expired", key);
            self.store.cache.remove(&key);
            return None;
        }

        if let Some(mtime) = directory_mtime(directory) {
            if entry.is_stale(mtime) {
                log::debug!("Cache entry for {} is stale (directory modified)", key);
                self.store.cache.remove(&key);
                return None;
            }
        }

        log::debug!("Cache hit for {} ({} files)", key, entry.file_count);
        Some(entry.results.clone())
    }

    /// Whether valid results are cached for `directory`.
    pub fn is_cached(&mut self, directory: &Path) -> bool {
        self.get(directory).is_some()
    }

    /// Cache the records of a completed scan of `directory` and persist.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the store cannot be written. The
    /// in-memory state is updated regardless.
    pub fn put(&mut self, directory: &Path, records: Vec<FileRecord>) -> CacheResult<()> {
        if self.settings.max_entries == 0 {
            log::debug!("Scan cache disabled (max_entries = 0)");
            return Ok(());
        }

        let key = normalize_dir_key(directory);
        if !self.store.cache.contains_key(&key) && self.store.cache.len() >= self.settings.max_entries
        {
            self.evict_least_recent();
        }

        log::debug!("Caching {} files for {}", records.len(), key);
        self.store
            .cache
            .insert(key.clone(), CacheEntry::new(records, now_epoch_secs()));

        self.store.history.retain(|k| *k != key);
        self.store.history.push(key);
        let limit = self.settings.max_entries.saturating_mul(2);
        if self.store.history.len() > limit {
            let excess = self.store.history.len() - limit;
            self.store.history.drain(..excess);
        }

        self.persist()
    }

    fn evict_least_recent(&mut self) {
        let victim = self
            .store
            .history
            .iter()
            .find(|key| self.store.cache.contains_key(*key))
            .cloned()
            .or_else(|| {
                self.store
                    .cache
                    .iter()
                    .min_by(|a, b| a.1.timestamp.total_cmp(&b.1.timestamp))
                    .map(|(key, _)| key.clone())
            });

        if let Some(victim) = victim {
            log::debug!("Evicting least recently scanned cache entry {}", victim);
            self.store.cache.remove(&victim);
        }
    }

    /// Remove every entry and the history, then persist.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the store cannot be written.
    pub fn clear(&mut self) -> CacheResult<()> {
        self.store = CacheStore::default();
        log::info!("Scan cache cleared");
        self.persist()
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            cached_dir_count: self.store.cache.len(),
            total_cached_files: self.store.cache.values().map(|e| e.file_count).sum(),
            history_size: self.store.history.len(),
            most_scanned_dir: self.ranked_history().into_iter().next().map(str::to_string),
            store_size_bytes: self
                .path
                .as_ref()
                .and_then(|p| fs::metadata(p).ok())
                .map_or(0, |m| m.len()),
        }
    }

    /// Guess the directory most likely to be scanned next.
    ///
    /// The most frequently scanned directory that is not the latest scan and
    /// still exists.
    #[must_use]
    pub fn predict_next(&self) -> Option<String> {
        let last = self.store.history.last()?;
        self.ranked_history()
            .into_iter()
            .find(|key| *key != last.as_str() && Path::new(key).exists())
            .map(str::to_string)
    }

    /// History entries by frequency, most frequent first; ties keep
    /// history order.
    fn ranked_history(&self) -> Vec<&str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for key in &self.store.history {
            let count = counts.entry(key.as_str()).or_insert(0);
            if *count == 0 {
                order.push(key.as_str());
            }
            *count += 1;
        }

        order.sort_by(|a, b| counts[b].cmp(&counts[a]));
        order
    }

    fn persist(&self) -> CacheResult<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        let io_error = |source| CacheError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let content = serde_json::to_string_pretty(&self.store)?;
        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        fs::write(&temp_path, content).map_err(io_error)?;
        fs::rename(&temp_path, path).map_err(io_error)?;
        log::trace!("Persisted scan cache to {}", path.display());
        Ok(())
    }
}
