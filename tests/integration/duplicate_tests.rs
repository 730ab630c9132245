use fileinventory::duplicates::{
    annotate_duplicates, format_size, DetectorConfig, DuplicateDetector, UNIQUE_LABEL,
};
use fileinventory::scanner::{DirectoryScanner, FileRecord, ScanOptions};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn scan(root: &Path) -> Vec<FileRecord> {
    DirectoryScanner::new(root, ScanOptions::default())
        .scan()
        .unwrap()
        .records
}

#[test]
fn test_one_duplicate_pair_among_three() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello world").unwrap();
    fs::write(dir.path().join("b.txt"), "hello world").unwrap();
    fs::write(dir.path().join("c.txt"), "hello there").unwrap();

    let records = scan(dir.path());
    let mut detector = DuplicateDetector::default();
    let groups = detector.find_duplicates(&records).to_vec();

    assert_eq!(groups.len(), 1);
    let names: Vec<_> = groups[0].files.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);

    let stats = detector.stats();
    assert_eq!(stats.duplicate_file_count, 1);
    assert_eq!(stats.wasted_bytes, 11);
    assert_eq!(stats.largest_group_size, 2);
}

#[test]
fn test_all_unique_files() {
    let dir = tempdir().unwrap();
    for (i, content) in ["one", "two!", "three", "four!!"].iter().enumerate() {
        fs::write(dir.path().join(format!("{i}.txt")), content).unwrap();
    }

    let records = scan(dir.path());
    let mut detector = DuplicateDetector::default();

    assert!(detector.find_duplicates(&records).is_empty());
    assert_eq!(detector.stats().group_count, 0);
    assert_eq!(detector.summary().candidate_files, 0);
}

#[test]
fn test_same_size_different_heads_are_not_grouped() {
    let dir = tempdir().unwrap();
    let mut a = vec![0u8; 4096];
    let mut b = vec![0u8; 4096];
    a[0] = 1;
    b[0] = 2;
    fs::write(dir.path().join("a.bin"), &a).unwrap();
    fs::write(dir.path().join("b.bin"), &b).unwrap();

    let records = scan(dir.path());
    let mut detector = DuplicateDetector::default();

    assert!(detector.find_duplicates(&records).is_empty());
    assert_eq!(detector.summary().quick_hashed, 2);
    assert_eq!(detector.summary().full_hashed, 0);
}

#[test]
fn test_quick_and_full_modes_agree() {
    let dir = tempdir().unwrap();
    let base = vec![7u8; 8192];
    let mut middle_differs = base.clone();
    middle_differs[4000] = 8;
    fs::write(dir.path().join("a.bin"), &base).unwrap();
    fs::write(dir.path().join("b.bin"), &base).unwrap();
    fs::write(dir.path().join("c.bin"), &middle_differs).unwrap();
    fs::write(dir.path().join("d.bin"), &base).unwrap();

    let records = scan(dir.path());
    let mut quick = DuplicateDetector::default();
    let mut full = DuplicateDetector::new(DetectorConfig::default().with_quick_hash(false));

    let quick_groups = quick.find_duplicates(&records).to_vec();
    let full_groups = full.find_duplicates(&records).to_vec();

    assert_eq!(quick_groups, full_groups);
    assert_eq!(quick_groups.len(), 1);
    assert_eq!(quick_groups[0].len(), 3);
}

#[test]
fn test_files_removed_after_scan_are_ignored() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "same").unwrap();
    fs::write(dir.path().join("b.txt"), "same").unwrap();
    let records = scan(dir.path());
    fs::remove_file(dir.path().join("b.txt")).unwrap();

    let mut detector = DuplicateDetector::default();
    assert!(detector.find_duplicates(&records).is_empty());
    assert_eq!(detector.summary().missing_files, 1);
}

#[test]
fn test_annotation_and_report() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("a.txt"), "pair").unwrap();
    fs::write(dir.path().join("sub").join("a copy.txt"), "pair").unwrap();
    fs::write(dir.path().join("x.txt"), "triple").unwrap();
    fs::write(dir.path().join("y.txt"), "triple").unwrap();
    fs::write(dir.path().join("z.txt"), "triple").unwrap();
    fs::write(dir.path().join("solo.txt"), "alone").unwrap();

    let mut records = scan(dir.path());
    let mut detector = DuplicateDetector::new(DetectorConfig::default().with_io_threads(2));
    let groups = detector.find_duplicates(&records).to_vec();
    annotate_duplicates(&mut records, &groups);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].len(), 3);

    let label = |name: &str| {
        records
            .iter()
            .find(|r| r.file_name == name)
            .and_then(|r| r.duplicate_group.clone())
            .unwrap()
    };
    assert_eq!(label("x.txt"), "Group 1 (3 files)");
    assert_eq!(label("a copy.txt"), "Group 2 (2 files)");
    assert_eq!(label("solo.txt"), UNIQUE_LABEL);

    let report = detector.render_report();
    let group1 = report.find("Group 1: 3 duplicates").unwrap();
    let group2 = report.find("Group 2: 2 duplicates").unwrap();
    assert!(report.starts_with("DUPLICATE FILE REPORT\n"));
    assert!(report.find("Largest Group: 3 files").unwrap() < group1);
    assert!(group1 < group2);
    assert!(report.contains(&format!("Wasted Space: {}", format_size(2.0 * 6.0 + 4.0))));

    let path = dir.path().join("report.txt");
    detector.export_report(&path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), report);
}
