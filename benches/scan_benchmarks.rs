use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fileinventory::duplicates::{DetectorConfig, DuplicateDetector};
use fileinventory::output::CsvExporter;
use fileinventory::scanner::{DirectoryScanner, Hasher, RowLayout, ScanOptions};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// Helper to create a test directory with a specific structure
fn setup_test_dir(depth: usize, files_per_dir: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    create_dir_recursive(temp_dir.path().to_path_buf(), depth, files_per_dir);
    temp_dir
}

fn create_dir_recursive(path: PathBuf, depth: usize, files_per_dir: usize) {
    if depth == 0 {
        return;
    }

    if !path.exists() {
        fs::create_dir_all(&path).expect("Failed to create dir");
    }

    for i in 0..files_per_dir {
        let file_path = path.join(format!("file_{}.txt", i));
        // Every third file shares content so detection has real groups to build.
        let content = format!("some content to make it a real file {}", i % 3);
        fs::write(file_path, content).expect("Failed to write file");
    }

    if depth > 1 {
        for i in 0..2 {
            let sub_dir = path.join(format!("dir_{}", i));
            create_dir_recursive(sub_dir, depth - 1, files_per_dir);
        }
    }
}

fn bench_scanner(c: &mut Criterion) {
    let temp_dir = setup_test_dir(4, 10); // depth 4, 10 files per dir -> 150 files

    c.bench_function("scanner_150_files", |b| {
        b.iter(|| {
            let outcome = DirectoryScanner::new(temp_dir.path(), ScanOptions::default())
                .scan()
                .unwrap();
            black_box(outcome.records);
        })
    });
}

fn bench_hasher(c: &mut Criterion) {
    let mut group = c.benchmark_group("hasher");
    let hasher = Hasher::new();

    for size_kb in [1, 1024, 10240] {
        let data = vec![b'a'; size_kb * 1024];
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("bench_file.dat");
        fs::write(&file_path, &data).expect("Failed to write bench file");

        group.bench_with_input(format!("full_{}KB", size_kb), &file_path, |b, path| {
            b.iter(|| black_box(hasher.full_hash(path).unwrap()));
        });
        group.bench_with_input(format!("quick_{}KB", size_kb), &file_path, |b, path| {
            b.iter(|| black_box(hasher.quick_hash(path).unwrap()));
        });
    }
    group.finish();
}

fn bench_detector(c: &mut Criterion) {
    let temp_dir = setup_test_dir(4, 10);
    let records = DirectoryScanner::new(temp_dir.path(), ScanOptions::default())
        .scan()
        .unwrap()
        .records;

    let mut group = c.benchmark_group("detector");
    for threads in [1, 4] {
        group.bench_function(format!("find_duplicates_{}_threads", threads), |b| {
            let mut detector = DuplicateDetector::new(DetectorConfig::default().with_io_threads(threads));
            b.iter(|| black_box(detector.find_duplicates(&records).len()));
        });
    }
    group.finish();
}

fn bench_csv_export(c: &mut Criterion) {
    let temp_dir = setup_test_dir(4, 10);
    let records = DirectoryScanner::new(temp_dir.path(), ScanOptions::default())
        .scan()
        .unwrap()
        .records;
    let layout = RowLayout::default();

    c.bench_function("csv_export_150_rows", |b| {
        b.iter(|| black_box(CsvExporter::new().to_string(&records, &layout).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_scanner,
    bench_hasher,
    bench_detector,
    bench_csv_export
);
criterion_main!(benches);
