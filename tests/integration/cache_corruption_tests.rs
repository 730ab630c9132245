use fileinventory::cache::{CacheSettings, ScanCache};
use fileinventory::scanner::FileRecord;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_garbage_file_opens_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scan_cache.json");
    fs::write(&path, b"not json at all {{{").unwrap();

    let cache = ScanCache::open(&path, CacheSettings::default());
    assert!(cache.is_empty());
    assert!(cache.history().is_empty());
}

#[test]
fn test_corrupt_file_is_replaced_on_next_write() {
    let data = tempdir().unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("scan_cache.json");
    fs::write(&path, b"\x00\x01\x02").unwrap();

    let mut cache = ScanCache::open(&path, CacheSettings::default());
    cache
        .put(data.path(), vec![FileRecord::new("R", data.path(), "a.txt")])
        .unwrap();

    let reopened = ScanCache::open(&path, CacheSettings::default());
    assert_eq!(reopened.len(), 1);
    assert!(!dir.path().join("scan_cache.json.tmp").exists());
}

#[test]
fn test_wrong_shape_opens_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scan_cache.json");
    fs::write(&path, r#"{"cache": [1, 2, 3], "history": "nope"}"#).unwrap();

    let cache = ScanCache::open(&path, CacheSettings::default());
    assert!(cache.is_empty());
}

#[test]
fn test_rows_without_extension_keys_are_derived() {
    let data = tempdir().unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("scan_cache.json");
    let key = data.path().to_string_lossy().to_string();
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs_f64()
        + 5.0;

    let store = serde_json::json!({
        "cache": {
            (key.clone()): {
                "results": [{
                    "RootFolder": "Legacy",
                    "FolderString": key.clone(),
                    "FullPath": format!("{key}/Report.DOCX"),
                    "FileName": "Report.DOCX",
                    "Folder1": null,
                    "DateCreated": "2023-05-01 09:30:00",
                    "DateModified": "not a date",
                    "Author": "Jane"
                }],
                "timestamp": now,
                "file_count": 1
            }
        },
        "history": [key]
    });
    fs::write(&path, serde_json::to_string(&store).unwrap()).unwrap();

    let mut cache = ScanCache::open(&path, CacheSettings::default());
    let rows = cache.get(data.path()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].extension, ".docx");
    assert_eq!(rows[0].file_type, "Document");
    assert_eq!(rows[0].author.as_deref(), Some("Jane"));
    assert!(rows[0].created.is_some());
    assert!(rows[0].modified.is_none());
}

#[test]
fn test_entry_with_missing_required_field_discards_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scan_cache.json");
    fs::write(
        &path,
        r#"{"cache": {"/data": {"results": [{"RootFolder": "R"}], "timestamp": 1.0, "file_count": 1}}, "history": ["/data"]}"#,
    )
    .unwrap();

    let cache = ScanCache::open(&path, CacheSettings::default());
    assert!(cache.is_empty());
}
