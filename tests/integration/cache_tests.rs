use filetime::{set_file_mtime, FileTime};
use fileinventory::cache::{CacheSettings, ScanCache};
use fileinventory::scanner::{DirectoryScanner, FileRecord, ScanOptions};
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::tempdir;

fn settings(max_entries: usize) -> CacheSettings {
    CacheSettings {
        max_entries,
        ..CacheSettings::default()
    }
}

fn rows(dir: &Path, n: usize) -> Vec<FileRecord> {
    (0..n)
        .map(|i| FileRecord::new("Root", dir, format!("file{i}.txt")))
        .collect()
}

#[test]
fn test_cache_hit_returns_scan_results() {
    let data = tempdir().unwrap();
    fs::write(data.path().join("a.txt"), "x").unwrap();
    let cache_dir = tempdir().unwrap();
    let cache_path = cache_dir.path().join("scan_cache.json");

    let outcome = DirectoryScanner::new(data.path(), ScanOptions::default())
        .scan()
        .unwrap();

    let mut cache = ScanCache::open(&cache_path, CacheSettings::default());
    cache.put(data.path(), outcome.records.clone()).unwrap();

    assert_eq!(cache.get(data.path()), Some(outcome.records));
    assert_eq!(cache.stats().cached_dir_count, 1);
    assert_eq!(cache.stats().total_cached_files, 1);
}

#[test]
fn test_reload_after_restart() {
    let data = tempdir().unwrap();
    let cache_dir = tempdir().unwrap();
    let cache_path = cache_dir.path().join("scan_cache.json");
    let records = rows(data.path(), 3);

    {
        let mut cache = ScanCache::open(&cache_path, CacheSettings::default());
        cache.put(data.path(), records.clone()).unwrap();
    }

    let mut reopened = ScanCache::open(&cache_path, CacheSettings::default());
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.get(data.path()), Some(records));
    assert_eq!(reopened.history().len(), 1);
}

#[test]
fn test_persisted_layout_keys() {
    let data = tempdir().unwrap();
    let cache_dir = tempdir().unwrap();
    let cache_path = cache_dir.path().join("scan_cache.json");

    let mut cache = ScanCache::open(&cache_path, CacheSettings::default());
    cache.put(data.path(), rows(data.path(), 2)).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&cache_path).unwrap()).unwrap();
    let entries = json["cache"].as_object().unwrap();
    assert_eq!(entries.len(), 1);
    let entry = entries.values().next().unwrap();
    assert_eq!(entry["file_count"], 2);
    assert!(entry["timestamp"].as_f64().unwrap() > 0.0);
    assert_eq!(entry["results"][1]["FileName"], "file1.txt");
    assert_eq!(json["history"].as_array().unwrap().len(), 1);
}

#[test]
fn test_directory_change_invalidates_entry() {
    let data = tempdir().unwrap();
    let mut cache = ScanCache::in_memory(CacheSettings::default());
    cache.put(data.path(), rows(data.path(), 1)).unwrap();
    assert!(cache.is_cached(data.path()));

    let later = SystemTime::now() + Duration::from_secs(60);
    set_file_mtime(data.path(), FileTime::from_system_time(later)).unwrap();

    assert!(cache.get(data.path()).is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_expired_entry_is_dropped() {
    let data = tempdir().unwrap();
    let mut cache = ScanCache::in_memory(CacheSettings {
        max_entries: 10,
        max_age_seconds: 0,
    });
    cache.put(data.path(), rows(data.path(), 1)).unwrap();
    std::thread::sleep(Duration::from_millis(20));

    assert!(cache.get(data.path()).is_none());
}

#[test]
fn test_lru_eviction() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let c = tempdir().unwrap();
    let mut cache = ScanCache::in_memory(settings(2));

    cache.put(a.path(), rows(a.path(), 1)).unwrap();
    cache.put(b.path(), rows(b.path(), 1)).unwrap();
    cache.put(c.path(), rows(c.path(), 1)).unwrap();

    assert_eq!(cache.len(), 2);
    assert!(!cache.is_cached(a.path()));
    assert!(cache.is_cached(b.path()));
    assert!(cache.is_cached(c.path()));
}

#[test]
fn test_rescan_refreshes_recency() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let c = tempdir().unwrap();
    let mut cache = ScanCache::in_memory(settings(2));

    cache.put(a.path(), rows(a.path(), 1)).unwrap();
    cache.put(b.path(), rows(b.path(), 1)).unwrap();
    cache.put(a.path(), rows(a.path(), 2)).unwrap();
    cache.put(c.path(), rows(c.path(), 1)).unwrap();

    assert!(cache.is_cached(a.path()));
    assert!(!cache.is_cached(b.path()));
    assert_eq!(cache.get(a.path()).unwrap().len(), 2);
}

#[test]
fn test_clear_persists_empty_store() {
    let data = tempdir().unwrap();
    let cache_dir = tempdir().unwrap();
    let cache_path = cache_dir.path().join("scan_cache.json");

    let mut cache = ScanCache::open(&cache_path, CacheSettings::default());
    cache.put(data.path(), rows(data.path(), 1)).unwrap();
    cache.clear().unwrap();

    let reopened = ScanCache::open(&cache_path, CacheSettings::default());
    assert!(reopened.is_empty());
    assert!(reopened.history().is_empty());
}

#[test]
fn test_predict_next_skips_last_scan() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let mut cache = ScanCache::in_memory(CacheSettings::default());

    assert_eq!(cache.predict_next(), None);

    cache.put(a.path(), rows(a.path(), 1)).unwrap();
    cache.put(b.path(), rows(b.path(), 1)).unwrap();

    let predicted = cache.predict_next().unwrap();
    assert_eq!(Path::new(&predicted), a.path());
}
