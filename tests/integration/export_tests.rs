use fileinventory::duplicates::{annotate_duplicates, DuplicateDetector};
use fileinventory::output::{CsvExporter, ExportError, ExportFormat, Exporter, JsonExporter};
use fileinventory::scanner::{DirectoryScanner, RowLayout, ScanOptions};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_csv_export_header_and_row_count() {
    let data = tempdir().unwrap();
    fs::create_dir(data.path().join("projects")).unwrap();
    fs::write(data.path().join("a.txt"), "a").unwrap();
    fs::write(data.path().join("projects").join("plan.docx"), "b").unwrap();
    fs::write(data.path().join("projects").join("budget.xlsx"), "c").unwrap();

    let options = ScanOptions::default();
    let layout = RowLayout::from_options(&options);
    let records = DirectoryScanner::new(data.path(), options)
        .scan()
        .unwrap()
        .records;

    let out = tempdir().unwrap();
    let dest = out.path().join("FileLocations.csv");
    let written = CsvExporter::new().export(&records, &layout, &dest).unwrap();
    assert_eq!(written, 3);

    let mut reader = csv::Reader::from_path(&dest).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        headers,
        vec![
            "RootFolder",
            "FolderString",
            "FullPath",
            "FileName",
            "Extension",
            "FileType",
            "Folder1",
            "Folder2",
            "Folder3",
            "DateCreated",
            "DateModified",
            "Author"
        ]
    );
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().any(|r| &r[3] == "plan.docx" && &r[6] == "Projects"));
}

#[test]
fn test_csv_export_with_duplicate_column() {
    let data = tempdir().unwrap();
    fs::write(data.path().join("a.txt"), "dup").unwrap();
    fs::write(data.path().join("b.txt"), "dup").unwrap();
    fs::write(data.path().join("c.txt"), "one").unwrap();

    let options = ScanOptions {
        include_dates: false,
        include_author: false,
        folder_column_count: 1,
        ..ScanOptions::default()
    };
    let layout = RowLayout::from_options(&options).with_duplicate_group(true);
    let mut records = DirectoryScanner::new(data.path(), options)
        .scan()
        .unwrap()
        .records;
    let mut detector = DuplicateDetector::default();
    let groups = detector.find_duplicates(&records).to_vec();
    annotate_duplicates(&mut records, &groups);

    let csv = CsvExporter::new().to_string(&records, &layout).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert!(lines[0].ends_with("Folder1,DuplicateGroup"));
    assert!(lines[1].ends_with(",Group 1 (2 files)"));
    assert!(lines[3].ends_with(",Unique"));
}

#[test]
fn test_json_export_round_trip_values() {
    let data = tempdir().unwrap();
    fs::write(data.path().join("notes.md"), "# hi").unwrap();

    let options = ScanOptions::default();
    let layout = RowLayout::from_options(&options);
    let records = DirectoryScanner::new(data.path(), options)
        .scan()
        .unwrap()
        .records;

    let out = tempdir().unwrap();
    let dest = out.path().join("inventory.json");
    let exporter = ExportFormat::Json.exporter();
    assert_eq!(exporter.export(&records, &layout, &dest).unwrap(), 1);

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&dest).unwrap()).unwrap();
    let row = &value[0];
    assert_eq!(row["FileName"], "notes.md");
    assert_eq!(row["FileType"], "Text");
    assert!(row["Folder1"].is_null());
    assert!(row["DateModified"].is_string());
    assert!(row["Author"].is_null());
}

#[test]
fn test_export_to_missing_directory_fails() {
    let out = tempdir().unwrap();
    let dest = out.path().join("missing").join("out.json");
    let result = JsonExporter::new().export(&[], &RowLayout::default(), &dest);
    assert!(matches!(result, Err(ExportError::Io { .. })));
}
