//! Status computation: comparing the workspace, the index, and the manifest
//! of the last commit to produce the three change lists `status` reports.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::ignore::IgnoreSet;
use crate::index::{Index, IndexEntry};
use crate::infra::encode_and_digest;
use crate::infra::fs::Fs;
use crate::objects::{Digest, Manifest};

/// One reported change: a path together with the kind of change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub path: String,
    pub change: Change,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Added,
    Modified,
    Deleted,
}

impl StatusEntry {
    fn new(path: impl Into<String>, change: Change) -> Self {
        StatusEntry { path: path.into(), change }
    }
}

/// The three change lists a `status` invocation reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    /// Staged changes that would be recorded by the next commit.
    pub indexed_changes: Vec<StatusEntry>,
    /// Workspace changes relative to the effective (index-overlaid)
    /// committed view that have not been staged at all.
    pub not_indexed_changes: Vec<StatusEntry>,
    /// Paths staged with one digest whose on-disk content has since moved
    /// on again, so the staged copy is already stale.
    pub indexed_but_changed: Vec<String>,
}

impl Status {
    pub fn has_uncommitted_changes(&self) -> bool {
        !self.indexed_changes.is_empty()
    }
}

/// Computes status by walking the workspace once and comparing every file
/// against the index and the last commit's manifest.
pub fn compute(
    fs: &dyn Fs,
    workspace_root: &str,
    index: &Index,
    last_commit_manifest: &Manifest,
    ignore: &IgnoreSet,
) -> Result<Status> {
    let indexed_changes = indexed_changes(index, last_commit_manifest);

    let mut tracked_or_staged: BTreeSet<String> = last_commit_manifest.paths().cloned().collect();
    tracked_or_staged.extend(index.paths().cloned());

    let mut seen_on_disk: BTreeSet<String> = BTreeSet::new();
    let mut not_indexed_changes = Vec::new();
    let mut indexed_but_changed = Vec::new();

    walk_files(fs, workspace_root, ignore, &mut |path| {
        seen_on_disk.insert(path.to_string());
        let contents = fs.read_bytes(path)?;
        let (_, digest_hex) = encode_and_digest(&contents);
        let on_disk_digest = Digest::from_hex(&digest_hex).expect("codec digest is always 40 hex chars");

        let expected = effective_digest(path, index, last_commit_manifest);
        match expected {
            Some(expected_digest) if expected_digest == on_disk_digest => {}
            Some(_) => not_indexed_changes.push(StatusEntry::new(path, Change::Modified)),
            None => not_indexed_changes.push(StatusEntry::new(path, Change::Added)),
        }

        if let Some(IndexEntry::Digest(staged)) = index.get(path) {
            if staged != on_disk_digest {
                indexed_but_changed.push(path.to_string());
            }
        }
        Ok(())
    })?;

    for path in &tracked_or_staged {
        if seen_on_disk.contains(path) {
            continue;
        }
        if let Some(IndexEntry::Tombstone) = index.get(path) {
            continue;
        }
        not_indexed_changes.push(StatusEntry::new(path.clone(), Change::Deleted));
    }

    Ok(Status {
        indexed_changes,
        not_indexed_changes,
        indexed_but_changed,
    })
}

/// The digest a path is expected to have once the index is applied on top
/// of the last commit: a staged digest wins, a tombstone means "expect
/// nothing", and otherwise the last commit's own record applies.
fn effective_digest(path: &str, index: &Index, last_commit_manifest: &Manifest) -> Option<Digest> {
    match index.get(path) {
        Some(IndexEntry::Digest(d)) => Some(d),
        Some(IndexEntry::Tombstone) => None,
        None => last_commit_manifest.get(path).copied(),
    }
}

fn indexed_changes(index: &Index, last_commit_manifest: &Manifest) -> Vec<StatusEntry> {
    let mut entries = Vec::new();
    for (path, entry) in index.iter() {
        match entry {
            IndexEntry::Digest(d) => match last_commit_manifest.get(path) {
                None => entries.push(StatusEntry::new(path.clone(), Change::Added)),
                Some(committed) if committed != d => {
                    entries.push(StatusEntry::new(path.clone(), Change::Modified))
                }
                Some(_) => {}
            },
            IndexEntry::Tombstone => {
                if last_commit_manifest.contains(path) {
                    entries.push(StatusEntry::new(path.clone(), Change::Deleted));
                }
            }
        }
    }
    entries
}

fn walk_files(
    fs: &dyn Fs,
    dir: &str,
    ignore: &IgnoreSet,
    visit: &mut dyn FnMut(&str) -> Result<()>,
) -> Result<()> {
    for child in fs.list_dir(dir)? {
        let path = if dir.is_empty() {
            child
        } else {
            format!("{}/{}", dir, child)
        };
        if ignore.is_ignored(&path) {
            continue;
        }
        if fs.is_file(&path) {
            visit(&path)?;
        } else {
            walk_files(fs, &path, ignore, visit)?;
        }
    }
    Ok(())
}
