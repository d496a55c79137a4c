use assert_fs::prelude::*;
use filetime::FileTime;
use mirror_fs::{io, tree};
use predicates::prelude::*;
use std::fs;

#[test]
fn copy_file_creates_missing_parents() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = temp.child("src/a.txt");
    source.write_str("alpha").unwrap();
    let destination = temp.child("replica/deep/nested/a.txt");

    let bytes = io::copy_file(source.path(), destination.path()).unwrap();

    assert_eq!(bytes, 5);
    destination.assert("alpha");
}

#[test]
fn copy_file_overwrites_existing_content() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = temp.child("a.txt");
    source.write_str("new").unwrap();
    let destination = temp.child("b.txt");
    destination.write_str("old and longer").unwrap();

    io::copy_file(source.path(), destination.path()).unwrap();

    destination.assert("new");
}

#[test]
fn copy_file_carries_modification_time() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = temp.child("a.txt");
    source.write_str("content").unwrap();
    let stamp = FileTime::from_unix_time(1_600_000_000, 0);
    filetime::set_file_mtime(source.path(), stamp).unwrap();
    let destination = temp.child("copy.txt");

    io::copy_file(source.path(), destination.path()).unwrap();

    let copied = fs::metadata(destination.path()).unwrap();
    assert_eq!(FileTime::from_last_modification_time(&copied), stamp);
}

#[test]
fn copy_file_missing_source_fails_without_creating_destination() {
    let temp = assert_fs::TempDir::new().unwrap();
    let destination = temp.child("out/a.txt");

    let result = io::copy_file(&temp.path().join("gone.txt"), destination.path());

    assert_eq!(result.unwrap_err().io_kind(), Some(std::io::ErrorKind::NotFound));
    destination.assert(predicate::path::missing());
}

#[test]
fn remove_dir_all_removes_subtree() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("sub/inner/c.txt").write_str("c").unwrap();

    io::remove_dir_all(&temp.path().join("sub")).unwrap();

    temp.child("sub").assert(predicate::path::missing());
}

#[test]
fn remove_file_missing_is_error() {
    let temp = assert_fs::TempDir::new().unwrap();
    assert!(io::remove_file(&temp.path().join("nothing")).is_err());
}

#[test]
fn create_dir_is_idempotent() {
    let temp = assert_fs::TempDir::new().unwrap();
    let dir = temp.path().join("x/y");

    io::create_dir(&dir).unwrap();
    io::create_dir(&dir).unwrap();

    assert!(tree::is_dir(&dir));
}
