use super::*;
use chrono::{Duration, TimeZone};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use tempfile::TempDir;

fn ts(day: u32, hour: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}

fn write_with_mtime(dir: &Path, name: &str, bytes: usize, modified: DateTime<Local>) {
    let path = dir.join(name);
    fs::write(&path, vec![0u8; bytes]).unwrap();
    let handle = fs::File::options().write(true).open(&path).unwrap();
    handle
        .set_modified(SystemTime::from(modified))
        .unwrap();
}

#[test]
fn orders_by_modification_time() {
    let collection = FileCollection::from_files(vec![
        File::new("/b/2", ts(2, 10), 20),
        File::new("/b/1", ts(1, 10), 10),
        File::new("/b/3", ts(3, 10), 30),
    ]);

    let oldest: Vec<_> = collection.oldest_first().map(|f| f.file_name()).collect();
    assert_eq!(oldest, vec!["1", "2", "3"]);
    let newest: Vec<_> = collection.newest_first().map(|f| f.file_name()).collect();
    assert_eq!(newest, vec!["3", "2", "1"]);
    assert_eq!(collection.newest().unwrap().file_name(), "3");
    assert_eq!(collection.total_size(), 60);
    assert_eq!(collection.len(), 3);
}

#[test]
fn equal_timestamps_keep_discovery_order() {
    let collection: FileCollection = vec![
        File::new("/b/first", ts(1, 10), 1),
        File::new("/b/second", ts(1, 10), 1),
        File::new("/b/third", ts(1, 10), 1),
    ]
    .into_iter()
    .collect();

    let names: Vec<_> = collection.oldest_first().map(|f| f.file_name()).collect();
    assert_eq!(names, vec!["first", "second", "third"]);
    assert_eq!(collection.newest().unwrap().file_name(), "third");
}

#[test]
fn age_is_relative_to_now() {
    let file = File::new("/b/x", ts(1, 10), 1);
    assert_eq!(file.age_at(ts(1, 12)), 7200);
    assert_eq!(file.age_at(ts(1, 10) - Duration::seconds(5)), -5);
}

#[test]
fn scan_picks_matching_files_only() {
    let temp_dir = TempDir::new().unwrap();
    write_with_mtime(temp_dir.path(), "db-20240501.sql.gz", 10, ts(1, 3));
    write_with_mtime(temp_dir.path(), "db-20240502.sql.gz", 20, ts(2, 3));
    write_with_mtime(temp_dir.path(), "db-20240502.sql", 5, ts(2, 3));
    write_with_mtime(temp_dir.path(), "notes.txt", 5, ts(2, 3));
    fs::create_dir_all(temp_dir.path().join("db-20240503.sql.gz")).unwrap();

    let pattern = Regex::new(r"^db-[0-9]{8}\.sql\.gz$").unwrap();
    let collection = FileCollection::scan(temp_dir.path(), &pattern).unwrap();

    assert_eq!(collection.len(), 2);
    assert_eq!(collection.total_size(), 30);
    let newest = collection.newest().unwrap();
    assert_eq!(newest.file_name(), "db-20240502.sql.gz");
    assert_eq!(newest.modified(), ts(2, 3));
}

#[test]
fn scan_of_missing_directory_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let pattern = Regex::new(".*").unwrap();
    let collection = FileCollection::scan(&temp_dir.path().join("absent"), &pattern).unwrap();
    assert!(collection.is_empty());
    assert!(collection.newest().is_none());
}

#[test]
fn scan_template_covers_every_dated_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    for dir in ["2023/11", "2024/04", "2024/05", "misc/05", "2024/xx"] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    write_with_mtime(&root.join("2023/11"), "db-1.sql", 1, ts(1, 0));
    write_with_mtime(&root.join("2024/04"), "db-2.sql", 1, ts(2, 0));
    write_with_mtime(&root.join("2024/05"), "db-3.sql", 1, ts(3, 0));
    write_with_mtime(&root.join("2024/05"), "notes.txt", 1, ts(3, 0));
    write_with_mtime(&root.join("misc/05"), "db-4.sql", 1, ts(4, 0));
    write_with_mtime(&root.join("2024/xx"), "db-5.sql", 1, ts(5, 0));
    // a file where a directory is expected is not descended into
    write_with_mtime(root, "2022", 1, ts(6, 0));

    let pattern = Regex::new(r"^db-\d\.sql$").unwrap();
    let collection = FileCollection::scan_template(&root.join("%Y").join("%m"), &pattern).unwrap();

    let paths: Vec<_> = collection
        .oldest_first()
        .map(|f| f.path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        paths,
        vec![
            Path::new("2023/11/db-1.sql"),
            Path::new("2024/04/db-2.sql"),
            Path::new("2024/05/db-3.sql"),
        ]
    );
}

#[test]
fn scan_template_without_placeholders_is_a_plain_scan() {
    let temp_dir = TempDir::new().unwrap();
    write_with_mtime(temp_dir.path(), "db-1.sql", 1, ts(1, 0));
    let pattern = Regex::new(r"^db-\d\.sql$").unwrap();

    let collection = FileCollection::scan_template(temp_dir.path(), &pattern).unwrap();
    assert_eq!(collection.len(), 1);

    let missing = temp_dir.path().join("nope").join("%Y");
    assert!(FileCollection::scan_template(&missing, &pattern).unwrap().is_empty());
}
