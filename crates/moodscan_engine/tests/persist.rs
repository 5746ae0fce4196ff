use std::fs;

use moodscan_engine::{replace_file, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_data_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("nested").join("data");

    let path = replace_file(&new_dir, "history.json", b"[]").unwrap();
    assert!(new_dir.is_dir());
    assert_eq!(path, new_dir.join("history.json"));
}

#[test]
fn replaces_existing_file() {
    let temp = TempDir::new().unwrap();

    let first = replace_file(temp.path(), "history.json", b"[]").unwrap();
    assert_eq!(fs::read_to_string(&first).unwrap(), "[]");

    let second = replace_file(temp.path(), "history.json", b"[1]").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "[1]");
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn refuses_file_in_place_of_dir() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let err = replace_file(&file_path, "history.json", b"[]").unwrap_err();
    assert!(matches!(err, PersistError::NotADirectory(_)));
    assert_eq!(fs::read_to_string(&file_path).unwrap(), "x");
}
