//! The `Repository`: the single entry point tying together the object
//! store, the refs, the index, and workspace state into the operations the
//! CLI dispatches to (`init`, `status`, `index`, `commit`, `checkout`,
//! `reset`, `merge`, `log`, `branch`, `print`).

use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ignore::{IgnoreSet, META_DIR};
use crate::index::{Index, IndexEntry, IndexStore};
use crate::infra::decode;
use crate::infra::fs::Fs;
use crate::objects::{Commit, Digest, EntryKind, Manifest, ObjectStore, Tree, TreeEntry};
use crate::refs::{BranchStore, HeadStore};
use crate::state::State;
use crate::status::Status;

pub const HEAD_PATH: &str = ".mygit/head";
pub const CONFIG_PATH: &str = ".mygit/config";
pub const OBJECTS_DIR: &str = ".mygit/objects";
pub const REFS_DIR: &str = ".mygit/refs/branches";
pub const INDEX_DIR: &str = ".mygit/index";
pub const DEFAULT_BRANCH: &str = "master";

/// One entry of `log`'s history walk: a commit together with the digest it
/// is stored under.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub digest: Digest,
    pub commit: Commit,
}

/// A mygit repository rooted at some `Fs` implementation. Holds the parsed
/// config and the loaded `State` (index, ignore set, last-commit manifest,
/// memoised status) for the duration of one invocation.
pub struct Repository<'a> {
    fs: &'a dyn Fs,
    config: Config,
    state: State,
}

impl<'a> Repository<'a> {
    fn object_store(&self) -> ObjectStore<'a> {
        ObjectStore::new(self.fs, OBJECTS_DIR)
    }

    fn branch_store(&self) -> BranchStore<'a> {
        BranchStore::new(self.fs, REFS_DIR)
    }

    fn head_store(&self) -> HeadStore<'a> {
        HeadStore::new(self.fs, HEAD_PATH)
    }

    fn index_store(&self) -> IndexStore<'a> {
        IndexStore::new(self.fs, INDEX_DIR)
    }

    /// Whether a repository meta-directory exists at the workspace root.
    pub fn exists(fs: &dyn Fs) -> bool {
        fs.exists(META_DIR)
    }

    /// Creates a brand new repository: the `.mygit` layout, a `master`
    /// branch with no commits yet, a seeded ignore file naming the
    /// meta-directory, and an initial commit recording that ignore file.
    pub fn init(fs: &'a dyn Fs) -> Result<Self> {
        if Self::exists(fs) {
            return Err(Error::AlreadyARepository(".".into()));
        }

        fs.create_dir(META_DIR)?;
        fs.create_dir(OBJECTS_DIR)?;
        fs.create_dir(".mygit/refs")?;
        fs.create_dir(REFS_DIR)?;
        fs.create_dir(INDEX_DIR)?;
        fs.write_text(HEAD_PATH, DEFAULT_BRANCH)?;
        BranchStore::new(fs, REFS_DIR).create(DEFAULT_BRANCH, None)?;

        let config = Config::default();
        fs.write_text(&config.ignorefile, META_DIR)?;

        let state = State::load(fs, &config.ignorefile, INDEX_DIR, REFS_DIR, HEAD_PATH, OBJECTS_DIR)?;
        let mut repo = Repository { fs, config, state };

        let ignorefile = repo.config.ignorefile.clone();
        repo.stage(&ignorefile)?;
        repo.commit("init")?;
        Ok(repo)
    }

    /// Opens an existing repository, loading its config and state.
    pub fn open(fs: &'a dyn Fs) -> Result<Self> {
        if !Self::exists(fs) {
            return Err(Error::NotARepository(".".into()));
        }
        let config = Config::load(fs, CONFIG_PATH)?;
        let state = State::load(fs, &config.ignorefile, INDEX_DIR, REFS_DIR, HEAD_PATH, OBJECTS_DIR)?;
        Ok(Repository { fs, config, state })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // -- staging --------------------------------------------------------

    pub fn stage(&mut self, path: &str) -> Result<()> {
        let store = self.index_store();
        store.stage(
            path,
            &mut self.state.current_index,
            &self.state.last_commit_manifest,
            &self.state.ignored,
            &self.object_store(),
        )?;
        store.persist(&self.state.current_index)?;
        self.state.invalidate_status();
        Ok(())
    }

    pub fn stage_all(&mut self) -> Result<()> {
        let store = self.index_store();
        store.stage_all(
            "",
            &mut self.state.current_index,
            &self.state.last_commit_manifest,
            &self.state.ignored,
            &self.object_store(),
        )?;
        store.persist(&self.state.current_index)?;
        self.state.invalidate_status();
        Ok(())
    }

    // -- status -----------------------------------------------------------

    /// Computes (or returns the memoised) status for this invocation.
    pub fn status(&mut self) -> Result<&Status> {
        if self.state.status().is_none() {
            let status = crate::status::compute(
                self.fs,
                "",
                &self.state.current_index,
                &self.state.last_commit_manifest,
                &self.state.ignored,
            )?;
            self.state.set_status(status);
        }
        Ok(self.state.status().expect("just computed"))
    }

    pub fn ignored(&self) -> &IgnoreSet {
        &self.state.ignored
    }

    pub fn index(&self) -> &Index {
        &self.state.current_index
    }

    // -- commit -----------------------------------------------------------

    /// Records a new commit from the current workspace contents, per the
    /// workspace-walking algorithm: every non-ignored directory is visited
    /// live, and each file's contributed digest is resolved from the index
    /// (promoting any staged payload into the object store), else carried
    /// forward from the last commit, else treated as untracked.
    pub fn commit(&mut self, message: &str) -> Result<Digest> {
        if self.status()?.indexed_changes.is_empty() {
            return Err(Error::EmptyCommit);
        }

        let objects = self.object_store();
        let mut manifest_entries = std::collections::BTreeMap::new();
        let tree_digest = self.build_tree_from_workspace("", &objects, &mut manifest_entries)?;
        let tree_digest = match tree_digest {
            Some(d) => d,
            None => objects.put(b"")?,
        };

        let manifest = Manifest::from_entries(manifest_entries);
        let manifest_digest = objects.put(manifest.serialize().as_bytes())?;

        let branch = self.head_store().head()?;
        let parent = self.branch_store().tip(&branch)?;
        let commit = Commit::new(tree_digest, manifest_digest, message, now_timestamp(), parent);
        let commit_digest = objects.put(commit.serialize().as_bytes())?;

        self.branch_store().set_tip(&branch, commit_digest)?;
        self.index_store().clean(&mut self.state.current_index)?;

        self.state.last_commit_manifest = manifest;
        self.state.invalidate_status();
        Ok(commit_digest)
    }

    /// Resolves one child file's contribution to the commit under
    /// construction: a staged digest (promoting its payload if present), a
    /// carried-forward last-commit digest, or absent.
    fn commit_blob(&self, path: &str, objects: &ObjectStore) -> Result<Option<Digest>> {
        match self.state.current_index.get(path) {
            Some(IndexEntry::Tombstone) => Ok(None),
            Some(IndexEntry::Digest(digest)) => {
                objects.rename_from_index(&digest, self.index_store().index_dir())?;
                Ok(Some(digest))
            }
            None => Ok(self.state.last_commit_manifest.get(path).copied()),
        }
    }

    /// Post-order walk of the live workspace tree: returns `None` for a
    /// directory that ends up contributing nothing (so its parent omits the
    /// entry entirely), or `Some(digest)` for a directory serialised and
    /// stored. Populates `manifest_entries` with every blob that survives.
    fn build_tree_from_workspace(
        &self,
        dir: &str,
        objects: &ObjectStore,
        manifest_entries: &mut std::collections::BTreeMap<String, Digest>,
    ) -> Result<Option<Digest>> {
        let mut children: Vec<String> = self.fs.list_dir(dir)?;
        children.sort();

        let mut entries = Vec::new();
        for child in children {
            let path = join(dir, &child);
            if self.state.ignored.is_ignored(&path) {
                continue;
            }
            if self.fs.is_file(&path) {
                if let Some(digest) = self.commit_blob(&path, objects)? {
                    manifest_entries.insert(path.clone(), digest);
                    entries.push(TreeEntry { kind: EntryKind::Blob, path: child, digest });
                }
            } else if let Some(digest) =
                self.build_tree_from_workspace(&path, objects, manifest_entries)?
            {
                entries.push(TreeEntry { kind: EntryKind::Tree, path: child, digest });
            }
        }

        if entries.is_empty() {
            return Ok(None);
        }
        let tree = Tree::from_entries(entries)?;
        Ok(Some(objects.put(tree.serialize().as_bytes())?))
    }

    fn load_commit(&self, digest: &Digest) -> Result<Commit> {
        let objects = self.object_store();
        let text = objects.decoded_text(digest)?;
        Commit::parse(&text, &digest.to_string())
    }

    fn manifest_for_tip(&self, tip: Option<Digest>) -> Result<Manifest> {
        match tip {
            None => Ok(Manifest::new()),
            Some(digest) => {
                let commit = self.load_commit(&digest)?;
                let objects = self.object_store();
                let text = objects.decoded_text(&commit.manifest)?;
                Manifest::parse(&text, &commit.manifest.to_string())
            }
        }
    }

    // -- checkout / branch management --------------------------------------

    /// Switches to an existing branch: fails on uncommitted changes, clears
    /// the non-ignored workspace, materialises the branch tip's tree, and
    /// updates HEAD.
    pub fn checkout(&mut self, branch_name: &str) -> Result<()> {
        if !self.branch_store().exists(branch_name) {
            return Err(Error::BranchNotFound(branch_name.to_string()));
        }
        if self.status()?.has_uncommitted_changes() {
            return Err(Error::UncommittedChanges);
        }

        let tip = self.branch_store().tip(branch_name)?;
        clear_workspace(self.fs, &self.state.ignored)?;
        if let Some(commit_digest) = tip {
            let commit = self.load_commit(&commit_digest)?;
            materialize(self.fs, &self.object_store(), &commit.tree, "")?;
        }

        self.head_store().set_head(branch_name)?;
        self.state.last_commit_manifest = self.manifest_for_tip(tip)?;
        self.state.invalidate_status();
        Ok(())
    }

    /// Creates a new branch pointing at the current tip and switches HEAD
    /// to it. The workspace and index are left untouched.
    pub fn new_branch_and_checkout(&mut self, name: &str) -> Result<()> {
        let current_branch = self.head_store().head()?;
        let tip = self.branch_store().tip(&current_branch)?;
        self.branch_store().create(name, tip)?;
        self.head_store().set_head(name)?;
        Ok(())
    }

    pub fn create_branch(&self, name: &str, tip: Option<Digest>) -> Result<()> {
        self.branch_store().create(name, tip)
    }

    pub fn remove_branch(&self, name: &str) -> Result<()> {
        let current = self.head_store().head()?;
        if current == name {
            return Err(Error::CannotDeleteCurrentBranch);
        }
        self.branch_store().remove(name)
    }

    pub fn list_branches(&self) -> Result<Vec<String>> {
        self.branch_store().list()
    }

    pub fn current_branch(&self) -> Result<String> {
        self.head_store().head()
    }

    pub fn branch_tip(&self, name: &str) -> Result<Option<Digest>> {
        self.branch_store().tip(name)
    }

    // -- reset --------------------------------------------------------------

    /// Restores a single path (file or tracked directory) from the last
    /// commit manifest into the workspace, or deletes it if untracked.
    fn restore_path_hard(&self, path: &str) -> Result<()> {
        let tracked: Vec<String> = self
            .state
            .last_commit_manifest
            .paths_under(path)
            .into_iter()
            .cloned()
            .collect();

        if !tracked.is_empty() {
            let objects = self.object_store();
            for tracked_path in tracked {
                let digest = *self.state.last_commit_manifest.get(&tracked_path).expect("just listed");
                let bytes = decode(&objects.get(&digest)?)?;
                self.fs.write_bytes(&tracked_path, &bytes)?;
            }
            return Ok(());
        }

        if self.fs.exists(path) {
            if self.fs.is_file(path) {
                self.fs.remove_file(path)?;
            } else {
                remove_dir_recursive(self.fs, path, &self.state.ignored)?;
            }
        }
        Ok(())
    }

    /// `reset -i [paths…] [--hard]`: unstages the named paths (or, with no
    /// paths, every staged path), optionally restoring the workspace copies
    /// from the last commit first.
    pub fn reset_indexed(&mut self, paths: &[String], hard: bool) -> Result<()> {
        if paths.is_empty() {
            if hard {
                let indexed: Vec<String> = self.state.current_index.paths().cloned().collect();
                for path in &indexed {
                    self.restore_path_hard(path)?;
                }
            }
            self.index_store().clean(&mut self.state.current_index)?;
        } else {
            if hard {
                for path in paths {
                    self.restore_path_hard(path)?;
                }
            }
            self.index_store().delete_entries(paths, &mut self.state.current_index)?;
        }
        self.state.invalidate_status();
        Ok(())
    }

    /// `reset` with no flags: clears the non-ignored workspace and
    /// re-materialises the tree at the current branch tip, leaving the
    /// index untouched.
    pub fn reset_hard_to_tip(&mut self) -> Result<()> {
        let branch = self.head_store().head()?;
        let tip = self.branch_store().tip(&branch)?;
        clear_workspace(self.fs, &self.state.ignored)?;
        if let Some(commit_digest) = tip {
            let commit = self.load_commit(&commit_digest)?;
            materialize(self.fs, &self.object_store(), &commit.tree, "")?;
        }
        self.state.invalidate_status();
        Ok(())
    }

    // -- merge ----------------------------------------------------------

    /// Fast-forward-only merge: advances the current branch to `target`'s
    /// tip if and only if the current tip occurs on `target`'s parent
    /// chain.
    pub fn merge(&mut self, target_name: &str) -> Result<()> {
        if !self.branch_store().exists(target_name) {
            return Err(Error::BranchNotFound(target_name.to_string()));
        }

        let current_branch = self.head_store().head()?;
        let current_tip = self.branch_store().tip(&current_branch)?;
        let target_tip = self.branch_store().tip(target_name)?;

        if current_tip == target_tip {
            return Err(Error::AlreadyUpToDate);
        }
        if self.status()?.has_uncommitted_changes() {
            return Err(Error::UncommittedChanges);
        }

        let mut reachable = current_tip.is_none();
        let mut cursor = target_tip;
        while let Some(digest) = cursor {
            if Some(digest) == current_tip {
                reachable = true;
                break;
            }
            cursor = self.load_commit(&digest)?.parent;
        }
        if !reachable {
            return Err(Error::FastForwardImpossible { target: target_name.to_string() });
        }

        clear_workspace(self.fs, &self.state.ignored)?;
        if let Some(digest) = target_tip {
            let commit = self.load_commit(&digest)?;
            materialize(self.fs, &self.object_store(), &commit.tree, "")?;
            self.branch_store().set_tip(&current_branch, digest)?;
        }

        self.state.last_commit_manifest = self.manifest_for_tip(target_tip)?;
        self.state.invalidate_status();
        Ok(())
    }

    // -- log / print ------------------------------------------------------

    /// Walks the commit chain from the current branch tip to the root,
    /// newest first. A linear walk is sufficient: every commit has at most
    /// one parent.
    pub fn log(&self) -> Result<Vec<LogEntry>> {
        let branch = self.head_store().head()?;
        let mut cursor = self.branch_store().tip(&branch)?;
        let mut entries = Vec::new();
        while let Some(digest) = cursor {
            let commit = self.load_commit(&digest)?;
            cursor = commit.parent;
            entries.push(LogEntry { digest, commit });
        }
        Ok(entries)
    }

    /// Decompresses and returns the text body of each named object. A
    /// checksum that does not resolve to any stored object is a user error
    /// (§7 kind 1: "object checksum unknown"), not repository corruption —
    /// the caller just typo'd or guessed a digest, nothing is referencing it.
    pub fn print_objects(&self, checksums: &[String]) -> Result<Vec<String>> {
        let objects = self.object_store();
        checksums
            .iter()
            .map(|s| {
                let digest = Digest::from_hex(s)?;
                objects.decoded_text(&digest).map_err(|e| match e {
                    Error::ObjectNotFound(d) => Error::UnknownChecksum(d),
                    other => other,
                })
            })
            .collect()
    }
}

fn join(dir: &str, child: &str) -> String {
    if dir.is_empty() {
        child.to_string()
    } else {
        format!("{}/{}", dir, child)
    }
}

/// Decodes the tree at `digest` and writes it under `dir`: blob entries
/// become files with their decoded bytes, tree entries become directories
/// populated recursively. HEAD and history are not touched by this step, so
/// a crash mid-materialisation is safely retried by re-running it.
fn materialize(fs: &dyn Fs, objects: &ObjectStore, digest: &Digest, dir: &str) -> Result<()> {
    let text = objects.decoded_text(digest)?;
    let tree = Tree::parse(&text, &digest.to_string())?;
    for entry in tree.entries() {
        let path = join(dir, &entry.path);
        match entry.kind {
            EntryKind::Blob => {
                let bytes = decode(&objects.get(&entry.digest)?)?;
                fs.write_bytes(&path, &bytes)?;
            }
            EntryKind::Tree => {
                fs.create_dir(&path)?;
                materialize(fs, objects, &entry.digest, &path)?;
            }
        }
    }
    Ok(())
}

/// Recursively deletes every non-ignored top-level entry of the workspace.
fn clear_workspace(fs: &dyn Fs, ignore: &IgnoreSet) -> Result<()> {
    for child in fs.list_dir("")? {
        if ignore.is_ignored(&child) {
            continue;
        }
        if fs.is_file(&child) {
            fs.remove_file(&child)?;
        } else {
            remove_dir_recursive(fs, &child, ignore)?;
        }
    }
    Ok(())
}

/// Deletes every non-ignored descendant of `dir`, then `dir` itself — but
/// only if it ends up empty. A directory whose sole remaining children are
/// ignored paths is left in place rather than treated as an error: it is
/// not this helper's job to remove ignored content.
fn remove_dir_recursive(fs: &dyn Fs, dir: &str, ignore: &IgnoreSet) -> Result<()> {
    for child in fs.list_dir(dir)? {
        let path = join(dir, &child);
        if ignore.is_ignored(&path) {
            continue;
        }
        if fs.is_file(&path) {
            fs.remove_file(&path)?;
        } else {
            remove_dir_recursive(fs, &path, ignore)?;
        }
    }
    if fs.is_empty(dir)? {
        fs.remove_dir(dir)?;
    }
    Ok(())
}

fn now_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .to_string()
}
