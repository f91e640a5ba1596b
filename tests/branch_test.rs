//! Integration tests for branch management and checkout, exercised against
//! the real filesystem.

use tempfile::TempDir;

use mygit::infra::fs::{Fs, RealFs};
use mygit::{Error, Repository};

fn workspace() -> (TempDir, RealFs) {
    let dir = TempDir::new().unwrap();
    let fs = RealFs::new(dir.path());
    (dir, fs)
}

fn init_with_commit(fs: &RealFs) -> Repository<'_> {
    let mut repo = Repository::init(fs).unwrap();
    fs.write_bytes("readme.md", b"# project").unwrap();
    repo.stage("readme.md").unwrap();
    repo.commit("initial commit").unwrap();
    repo
}

#[test]
fn test_create_branch_at_current_tip() {
    let (_dir, fs) = workspace();
    let repo = init_with_commit(&fs);

    let tip = repo.branch_tip("master").unwrap();
    repo.create_branch("feature", tip).unwrap();
    assert_eq!(repo.branch_tip("feature").unwrap(), tip);
}

#[test]
fn test_create_branch_duplicate_name_fails() {
    let (_dir, fs) = workspace();
    let repo = init_with_commit(&fs);

    assert!(matches!(
        repo.create_branch("master", None),
        Err(Error::BranchAlreadyExists(_))
    ));
}

#[test]
fn test_remove_branch() {
    let (_dir, fs) = workspace();
    let repo = init_with_commit(&fs);

    repo.create_branch("scratch", None).unwrap();
    assert!(repo.list_branches().unwrap().contains(&"scratch".to_string()));
    repo.remove_branch("scratch").unwrap();
    assert!(!repo.list_branches().unwrap().contains(&"scratch".to_string()));
}

#[test]
fn test_cannot_remove_current_branch() {
    let (_dir, fs) = workspace();
    let repo = init_with_commit(&fs);

    assert!(matches!(
        repo.remove_branch("master"),
        Err(Error::CannotDeleteCurrentBranch)
    ));
}

#[test]
fn test_list_branches_is_sorted() {
    let (_dir, fs) = workspace();
    let repo = init_with_commit(&fs);
    repo.create_branch("zeta", None).unwrap();
    repo.create_branch("alpha", None).unwrap();

    assert_eq!(repo.list_branches().unwrap(), vec!["alpha", "master", "zeta"]);
}

#[test]
fn test_checkout_switches_workspace_contents() {
    let (_dir, fs) = workspace();
    let mut repo = init_with_commit(&fs);

    repo.new_branch_and_checkout("feature").unwrap();
    fs.write_bytes("only_on_feature.txt", b"x").unwrap();
    repo.stage("only_on_feature.txt").unwrap();
    repo.commit("add feature file").unwrap();

    repo.checkout("master").unwrap();
    assert!(!fs.exists("only_on_feature.txt"));

    repo.checkout("feature").unwrap();
    assert!(fs.exists("only_on_feature.txt"));
}

#[test]
fn test_checkout_unknown_branch_fails() {
    let (_dir, fs) = workspace();
    let mut repo = init_with_commit(&fs);

    assert!(matches!(repo.checkout("ghost"), Err(Error::BranchNotFound(_))));
}

#[test]
fn test_checkout_with_uncommitted_changes_is_blocked() {
    let (_dir, fs) = workspace();
    let mut repo = init_with_commit(&fs);
    repo.create_branch("feature", None).unwrap();

    fs.write_bytes("readme.md", b"dirty edit").unwrap();
    repo.stage("readme.md").unwrap();

    assert!(matches!(
        repo.checkout("feature"),
        Err(Error::UncommittedChanges)
    ));
}

#[test]
fn test_new_branch_and_checkout_moves_head() {
    let (_dir, fs) = workspace();
    let mut repo = init_with_commit(&fs);

    repo.new_branch_and_checkout("dev").unwrap();
    assert_eq!(repo.current_branch().unwrap(), "dev");
}
