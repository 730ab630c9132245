//! Scan result caching.
//!
//! This module keeps the records of recent directory scans so that a repeat
//! scan of an unchanged directory can skip the walk entirely.
//!
//! # Architecture
//!
//! The caching system is split into two main components:
//!
//! * [`store`]: The [`ScanCache`] itself: lookup, LRU eviction, statistics,
//!   prediction and JSON persistence.
//! * [`entry`]: The data models stored in the cache and their validation logic.
//!
//! # Cache Invalidation
//!
//! An entry is discarded when:
//! * it is older than the configured maximum age (default seven days), or
//! * the directory's modification time is newer than the entry.
//!
//! The directory mtime only changes when entries are added, removed or
//! renamed directly inside it. Edits to existing files, or changes deeper in
//! the tree, leave a cached result in place until it ages out.
//!
//! # Example
//!
//! ```
//! use fileinventory::cache::{CacheSettings, ScanCache};
//! use fileinventory::scanner::FileRecord;
//! use std::path::Path;
//!
//! let mut cache = ScanCache::in_memory(CacheSettings::default());
//! let dir = Path::new("/nonexistent/share");
//! cache.put(dir, vec![FileRecord::new("Share", dir, "a.txt")])?;
//! assert_eq!(cache.get(dir).map(|rows| rows.len()), Some(1));
//! # Ok::<(), fileinventory::cache::CacheError>(())
//! ```

pub mod entry;
pub mod store;

pub use entry::{CacheEntry, CacheStore};
pub use store::{
    CacheError, CacheResult, CacheSettings, CacheStats, ScanCache, DEFAULT_MAX_AGE_SECONDS,
    DEFAULT_MAX_ENTRIES,
};
