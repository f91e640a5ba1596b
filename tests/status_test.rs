//! Integration tests for status computation driven through `Repository`,
//! exercised against the real filesystem.

use tempfile::TempDir;

use mygit::infra::fs::{Fs, RealFs};
use mygit::status::Change;
use mygit::Repository;

fn workspace() -> (TempDir, RealFs) {
    let dir = TempDir::new().unwrap();
    let fs = RealFs::new(dir.path());
    (dir, fs)
}

#[test]
fn test_status_clean_after_commit() {
    let (_dir, fs) = workspace();
    let mut repo = Repository::init(&fs).unwrap();
    fs.write_bytes("a.txt", b"hello").unwrap();
    repo.stage("a.txt").unwrap();
    repo.commit("add a").unwrap();

    let status = repo.status().unwrap();
    assert!(!status.has_uncommitted_changes());
    assert!(status.not_indexed_changes.is_empty());
}

#[test]
fn test_status_reports_staged_addition() {
    let (_dir, fs) = workspace();
    let mut repo = Repository::init(&fs).unwrap();
    fs.write_bytes("a.txt", b"hello").unwrap();
    repo.stage("a.txt").unwrap();

    let status = repo.status().unwrap();
    assert!(status.indexed_changes.iter().any(|e| e.path == "a.txt" && e.change == Change::Added));
}

#[test]
fn test_status_reports_unstaged_edit_after_commit() {
    let (_dir, fs) = workspace();
    let mut repo = Repository::init(&fs).unwrap();
    fs.write_bytes("a.txt", b"hello").unwrap();
    repo.stage("a.txt").unwrap();
    repo.commit("add a").unwrap();

    fs.write_bytes("a.txt", b"world").unwrap();
    let status = repo.status().unwrap();
    assert!(status
        .not_indexed_changes
        .iter()
        .any(|e| e.path == "a.txt" && e.change == Change::Modified));
}

#[test]
fn test_status_reports_unstaged_deletion_after_commit() {
    let (_dir, fs) = workspace();
    let mut repo = Repository::init(&fs).unwrap();
    fs.write_bytes("a.txt", b"hello").unwrap();
    repo.stage("a.txt").unwrap();
    repo.commit("add a").unwrap();

    fs.remove_file("a.txt").unwrap();
    let status = repo.status().unwrap();
    assert!(status
        .not_indexed_changes
        .iter()
        .any(|e| e.path == "a.txt" && e.change == Change::Deleted));
}

#[test]
fn test_status_ignores_ignored_files() {
    let (_dir, fs) = workspace();
    let repo = Repository::init(&fs).unwrap();
    fs.write_bytes(&repo.config().ignorefile, b"build.log\n").unwrap();
    fs.write_bytes("build.log", b"junk").unwrap();

    let status = repo.status().unwrap();
    assert!(!status.not_indexed_changes.iter().any(|e| e.path == "build.log"));
}

#[test]
fn test_status_reports_staged_digest_gone_stale() {
    let (_dir, fs) = workspace();
    let mut repo = Repository::init(&fs).unwrap();
    fs.write_bytes("a.txt", b"first").unwrap();
    repo.stage("a.txt").unwrap();

    fs.write_bytes("a.txt", b"second").unwrap();
    let status = repo.status().unwrap();
    assert_eq!(status.indexed_but_changed, vec!["a.txt".to_string()]);
}
