//! The per-invocation state cache: the ignore set, the current index, the
//! manifest of the last commit on the current branch, and a memoised status
//! snapshot, all loaded once and threaded through the operations a single
//! CLI invocation performs.

use crate::error::Result;
use crate::ignore::IgnoreSet;
use crate::index::Index;
use crate::infra::fs::Fs;
use crate::objects::{Commit, Manifest, ObjectStore};
use crate::refs::{BranchStore, HeadStore};
use crate::status::Status;

/// Everything an operation needs to read about the repository's current
/// condition, loaded once per invocation so a command that touches the
/// index, the ignore set, and the last commit doesn't re-read any of them
/// twice.
pub struct State {
    pub ignored: IgnoreSet,
    pub current_index: Index,
    pub last_commit_manifest: Manifest,
    status: Option<Status>,
}

impl State {
    /// Loads the ignore set, the index, and the manifest of the commit HEAD
    /// currently points to (an empty manifest for a branch with no commits
    /// yet).
    pub fn load(
        fs: &dyn Fs,
        ignore_file: &str,
        index_dir: &str,
        refs_dir: &str,
        head_path: &str,
        objects_dir: &str,
    ) -> Result<Self> {
        let ignored = IgnoreSet::load(fs, ignore_file)?;

        let index_store = crate::index::store::IndexStore::new(fs, index_dir);
        let current_index = index_store.load()?;

        let head = HeadStore::new(fs, head_path);
        let branches = BranchStore::new(fs, refs_dir);
        let objects = ObjectStore::new(fs, objects_dir);

        let branch_name = head.head()?;
        let tip = branches.tip(&branch_name)?;
        let last_commit_manifest = match tip {
            None => Manifest::new(),
            Some(commit_digest) => {
                let text = objects.decoded_text(&commit_digest)?;
                let commit = Commit::parse(&text, &commit_digest.to_string())?;
                let manifest_text = objects.decoded_text(&commit.manifest)?;
                Manifest::parse(&manifest_text, &commit.manifest.to_string())?
            }
        };

        Ok(State {
            ignored,
            current_index,
            last_commit_manifest,
            status: None,
        })
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = Some(status);
    }

    pub fn invalidate_status(&mut self) {
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::fs::MemFs;
    use crate::index::IndexEntry;
    use crate::objects::Digest;

    fn setup_empty_repo(fs: &MemFs) {
        fs.create_dir(".mygit").unwrap();
        fs.create_dir(".mygit/objects").unwrap();
        fs.create_dir(".mygit/refs").unwrap();
        fs.create_dir(".mygit/index").unwrap();
        fs.write_text(".mygit/head", "master").unwrap();
        BranchStore::new(fs, ".mygit/refs").create("master", None).unwrap();
    }

    #[test]
    fn test_load_fresh_repo_has_empty_manifest_and_index() {
        let fs = MemFs::new();
        setup_empty_repo(&fs);

        let state = State::load(
            &fs,
            ".mygit_ignore",
            ".mygit/index",
            ".mygit/refs",
            ".mygit/head",
            ".mygit/objects",
        )
        .unwrap();

        assert!(state.last_commit_manifest.is_empty());
        assert!(state.current_index.is_empty());
        assert!(state.ignored.is_ignored(".mygit"));
        assert!(state.status().is_none());
    }

    #[test]
    fn test_load_resolves_manifest_of_branch_tip() {
        let fs = MemFs::new();
        setup_empty_repo(&fs);

        let objects = ObjectStore::new(&fs, ".mygit/objects");
        let mut entries = std::collections::BTreeMap::new();
        let blob_digest = objects.put(b"hello").unwrap();
        entries.insert("readme.md".to_string(), blob_digest);
        let manifest = Manifest::from_entries(entries);
        let manifest_digest = objects.put(manifest.serialize().as_bytes()).unwrap();
        let tree_digest = objects.put(b"").unwrap();
        let commit = Commit::new(tree_digest, manifest_digest, "init", "2026-01-01", None);
        let commit_digest = objects.put(commit.serialize().as_bytes()).unwrap();

        BranchStore::new(&fs, ".mygit/refs")
            .set_tip("master", commit_digest)
            .unwrap();

        let state = State::load(
            &fs,
            ".mygit_ignore",
            ".mygit/index",
            ".mygit/refs",
            ".mygit/head",
            ".mygit/objects",
        )
        .unwrap();

        assert_eq!(state.last_commit_manifest.get("readme.md"), Some(&blob_digest));
    }

    #[test]
    fn test_load_picks_up_staged_index() {
        let fs = MemFs::new();
        setup_empty_repo(&fs);

        let digest = Digest::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
        let mut index = Index::new();
        index.set("a.txt", IndexEntry::Digest(digest));
        crate::index::store::IndexStore::new(&fs, ".mygit/index")
            .persist(&index)
            .unwrap();

        let state = State::load(
            &fs,
            ".mygit_ignore",
            ".mygit/index",
            ".mygit/refs",
            ".mygit/head",
            ".mygit/objects",
        )
        .unwrap();
        assert_eq!(state.current_index.get("a.txt"), Some(IndexEntry::Digest(digest)));
    }

    #[test]
    fn test_set_and_invalidate_status() {
        let fs = MemFs::new();
        setup_empty_repo(&fs);
        let mut state = State::load(
            &fs,
            ".mygit_ignore",
            ".mygit/index",
            ".mygit/refs",
            ".mygit/head",
            ".mygit/objects",
        )
        .unwrap();

        state.set_status(Status::default());
        assert!(state.status().is_some());
        state.invalidate_status();
        assert!(state.status().is_none());
    }
}
