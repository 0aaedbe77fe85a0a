use std::fs;

use tempfile::TempDir;
use tubedeck_engine::{export_url_list, ExportError};

#[test]
fn creates_missing_directory_and_writes_list() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("exports");

    let path = export_url_list(&dir, "urls.txt", "https://a.test\nhttps://b.test").unwrap();
    assert_eq!(path, dir.join("urls.txt"));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "https://a.test\nhttps://b.test"
    );
}

#[test]
fn replaces_previous_export() {
    let temp = TempDir::new().unwrap();
    let first = export_url_list(temp.path(), "urls.txt", "https://old.test").unwrap();
    let second = export_url_list(temp.path(), "urls.txt", "https://new.test").unwrap();

    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "https://new.test");
    // Only the export itself remains; the temp file was renamed into place.
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn file_in_place_of_directory_is_rejected() {
    let temp = TempDir::new().unwrap();
    let not_a_dir = temp.path().join("not_a_dir");
    fs::write(&not_a_dir, "x").unwrap();

    let err = export_url_list(&not_a_dir, "urls.txt", "https://a.test").unwrap_err();
    assert!(matches!(err, ExportError::OutputDir(_)));
}
