use fileinventory::scanner::{
    DirectoryScanner, FileRecord, NetworkMode, ScanError, ScanOptions,
};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

fn names(records: &[FileRecord]) -> Vec<&str> {
    records.iter().map(|r| r.file_name.as_str()).collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let outcome = DirectoryScanner::new(dir.path(), ScanOptions::default())
        .scan()
        .unwrap();

    assert!(outcome.records.is_empty());
    assert!(!outcome.cancelled);
    assert_eq!(outcome.skipped_entries, 0);
}

#[test]
fn test_scan_builds_folder_columns() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("annual reports").join("2024");
    fs::create_dir_all(&nested).unwrap();
    fs::write(dir.path().join("readme.txt"), "top").unwrap();
    fs::write(nested.join("Summary.PDF"), "pdf").unwrap();

    let options = ScanOptions {
        root_label: Some("Finance".to_string()),
        ..ScanOptions::default()
    };
    let outcome = DirectoryScanner::new(dir.path(), options).scan().unwrap();

    let top = outcome
        .records
        .iter()
        .find(|r| r.file_name == "readme.txt")
        .unwrap();
    assert_eq!(top.root_label, "Finance");
    assert_eq!(top.folders, vec![None, None, None]);
    assert_eq!(top.file_type, "Text");

    let deep = outcome
        .records
        .iter()
        .find(|r| r.file_name == "Summary.PDF")
        .unwrap();
    assert_eq!(deep.extension, ".pdf");
    assert_eq!(deep.file_type, "PDF");
    assert_eq!(
        deep.folders,
        vec![
            Some("Annual Reports".to_string()),
            Some("2024".to_string()),
            None
        ]
    );
    assert_eq!(deep.full_path, deep.folder_path.join(&deep.file_name));
    assert!(deep.modified.is_some());
}

#[test]
fn test_scan_folder_columns_truncate() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("a").join("b").join("c");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("f.txt"), "x").unwrap();

    let options = ScanOptions {
        folder_column_count: 2,
        title_case: false,
        ..ScanOptions::default()
    };
    let outcome = DirectoryScanner::new(dir.path(), options).scan().unwrap();

    assert_eq!(
        outcome.records[0].folders,
        vec![Some("a".to_string()), Some("b".to_string())]
    );
}

#[test]
fn test_scan_extension_filter() {
    let dir = tempdir().unwrap();
    for name in ["a.pdf", "b.DOCX", "c.txt", "noext"] {
        fs::write(dir.path().join(name), name).unwrap();
    }

    let options = ScanOptions {
        extension_filter: vec![".pdf".to_string(), ".docx".to_string()],
        ..ScanOptions::default()
    };
    let outcome = DirectoryScanner::new(dir.path(), options).scan().unwrap();

    assert_eq!(names(&outcome.records), vec!["a.pdf", "b.DOCX"]);
}

#[test]
fn test_scan_without_dates_or_author() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "x").unwrap();

    let options = ScanOptions {
        include_dates: false,
        include_author: false,
        ..ScanOptions::default()
    };
    let outcome = DirectoryScanner::new(dir.path(), options).scan().unwrap();

    assert!(outcome.records[0].created.is_none());
    assert!(outcome.records[0].modified.is_none());
    assert!(outcome.records[0].author.is_none());
}

#[test]
fn test_scan_missing_root() {
    let dir = tempdir().unwrap();
    let result = DirectoryScanner::new(&dir.path().join("missing"), ScanOptions::default()).scan();
    assert!(matches!(result, Err(ScanError::NotFound(_))));
}

#[test]
fn test_scan_file_root() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, "x").unwrap();

    let result = DirectoryScanner::new(&file, ScanOptions::default()).scan();
    assert!(matches!(result, Err(ScanError::NotADirectory(_))));
}

#[test]
fn test_scan_shutdown_flag() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "x").unwrap();

    let flag = Arc::new(AtomicBool::new(false));
    let scanner = DirectoryScanner::new(dir.path(), ScanOptions::default())
        .with_shutdown_flag(Arc::clone(&flag));

    flag.store(true, Ordering::SeqCst);
    let outcome = scanner.scan().unwrap();
    assert!(outcome.cancelled);
    assert!(outcome.records.is_empty());
}

#[test]
fn test_scan_forced_remote_mode() {
    let dir = tempdir().unwrap();
    for i in 0..15 {
        fs::write(dir.path().join(format!("f{i:02}.txt")), "x").unwrap();
    }

    let options = ScanOptions {
        network_mode: NetworkMode::Remote,
        ..ScanOptions::default()
    };
    let outcome = DirectoryScanner::new(dir.path(), options).scan().unwrap();

    assert!(outcome.network_mode_used);
    assert_eq!(outcome.records.len(), 15);
}

#[cfg(unix)]
#[test]
fn test_scan_does_not_follow_directory_symlinks() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("real");
    fs::create_dir(&real).unwrap();
    fs::write(real.join("inner.txt"), "x").unwrap();
    std::os::unix::fs::symlink(&real, dir.path().join("link")).unwrap();

    let outcome = DirectoryScanner::new(dir.path(), ScanOptions::default())
        .scan()
        .unwrap();

    assert_eq!(names(&outcome.records), vec!["inner.txt"]);
}
