//! Integration tests for `BranchStore` and `HeadStore` against the real
//! filesystem.

use tempfile::TempDir;

use mygit::infra::fs::{Fs, RealFs};
use mygit::{BranchStore, Digest, Error, HeadStore};

const D1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
const D2: &str = "356a192b7913b04c54574d18c28d46e6395428ab";

fn workspace() -> (TempDir, RealFs) {
    let dir = TempDir::new().unwrap();
    let fs = RealFs::new(dir.path());
    fs.create_dir("refs").unwrap();
    (dir, fs)
}

#[test]
fn test_branch_create_and_tip_roundtrip_on_disk() {
    let (_dir, fs) = workspace();
    let store = BranchStore::new(&fs, "refs");
    let digest = Digest::from_hex(D1).unwrap();

    store.create("master", Some(digest)).unwrap();
    assert_eq!(store.tip("master").unwrap(), Some(digest));
    assert!(fs.is_file("refs/master"));
}

#[test]
fn test_branch_set_tip_advances_on_disk() {
    let (_dir, fs) = workspace();
    let store = BranchStore::new(&fs, "refs");
    store.create("master", Some(Digest::from_hex(D1).unwrap())).unwrap();
    store.set_tip("master", Digest::from_hex(D2).unwrap()).unwrap();
    assert_eq!(store.tip("master").unwrap(), Some(Digest::from_hex(D2).unwrap()));
}

#[test]
fn test_branch_remove_deletes_ref_file() {
    let (_dir, fs) = workspace();
    let store = BranchStore::new(&fs, "refs");
    store.create("scratch", None).unwrap();
    assert!(fs.exists("refs/scratch"));
    store.remove("scratch").unwrap();
    assert!(!fs.exists("refs/scratch"));
}

#[test]
fn test_branch_tip_of_missing_branch_is_not_found() {
    let (_dir, fs) = workspace();
    let store = BranchStore::new(&fs, "refs");
    assert!(matches!(store.tip("nope"), Err(Error::BranchNotFound(_))));
}

#[test]
fn test_branch_list_is_sorted() {
    let (_dir, fs) = workspace();
    let store = BranchStore::new(&fs, "refs");
    store.create("zeta", None).unwrap();
    store.create("alpha", None).unwrap();
    store.create("master", None).unwrap();
    assert_eq!(store.list().unwrap(), vec!["alpha", "master", "zeta"]);
}

#[test]
fn test_head_set_and_read_roundtrip_on_disk() {
    let dir = TempDir::new().unwrap();
    let fs = RealFs::new(dir.path());
    let head = HeadStore::new(&fs, "head");

    head.set_head("master").unwrap();
    assert_eq!(head.head().unwrap(), "master");

    head.set_head("dev").unwrap();
    assert_eq!(head.head().unwrap(), "dev");
}
