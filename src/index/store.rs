//! Operations over the index: staging workspace changes, persisting the
//! index file, and managing the side directory of staged blob payloads.

use tracing::warn;

use crate::error::{Error, Result};
use crate::ignore::IgnoreSet;
use crate::index::{Index, IndexEntry};
use crate::infra::encode_and_digest;
use crate::infra::fs::Fs;
use crate::objects::{Digest, Manifest, ObjectStore};

/// Operates on the compressed index file and the `index/<digest>` staged
/// blob payloads that sit alongside it.
pub struct IndexStore<'a> {
    fs: &'a dyn Fs,
    index_file: String,
    index_dir: String,
}

impl<'a> IndexStore<'a> {
    pub fn new(fs: &'a dyn Fs, index_dir: impl Into<String>) -> Self {
        let index_dir = index_dir.into();
        let index_file = format!("{}/index", index_dir);
        IndexStore { fs, index_file, index_dir }
    }

    pub fn index_dir(&self) -> &str {
        &self.index_dir
    }

    /// Reads and decompresses the current index. An absent or empty index
    /// file parses to an empty index.
    pub fn load(&self) -> Result<Index> {
        if !self.fs.exists(&self.index_file) {
            return Ok(Index::new());
        }
        let stored = self.fs.read_bytes(&self.index_file)?;
        if stored.is_empty() {
            return Ok(Index::new());
        }
        let raw = crate::infra::decode(&stored)?;
        let text = String::from_utf8(raw).map_err(|_| Error::InvalidUtf8)?;
        Index::parse(&text, &self.index_file)
    }

    /// Rewrites the compressed index file from `index`.
    pub fn persist(&self, index: &Index) -> Result<()> {
        let (stored, _) = encode_and_digest(index.serialize().as_bytes());
        self.fs.write_bytes(&self.index_file, &stored)?;
        Ok(())
    }

    fn payload_path(&self, digest: &Digest) -> String {
        format!("{}/{}", self.index_dir, digest)
    }

    fn remove_payload_if_present(&self, digest: &Digest) -> Result<()> {
        let path = self.payload_path(digest);
        if self.fs.exists(&path) {
            self.fs.remove_file(&path)?;
        }
        Ok(())
    }

    /// Stages a single workspace path (file or directory, recursively) into
    /// `index`. Paths that do not exist and are not recorded in the last
    /// commit are a user error. Ignored paths are skipped with a warning,
    /// not an error.
    pub fn stage(
        &self,
        path: &str,
        index: &mut Index,
        last_commit_manifest: &Manifest,
        ignore: &IgnoreSet,
        objects: &ObjectStore,
    ) -> Result<()> {
        if ignore.is_ignored(path) {
            warn!(path, "skipping ignored path");
            return Ok(());
        }

        if self.fs.exists(path) {
            if self.fs.is_file(path) {
                self.stage_file(path, index, last_commit_manifest, objects)?;
            } else {
                for child in self.fs.list_dir(path)? {
                    let child_path = format!("{}/{}", path, child);
                    self.stage(&child_path, index, last_commit_manifest, ignore, objects)?;
                }
            }
            return Ok(());
        }

        if last_commit_manifest.contains(path) {
            index.set(path, IndexEntry::Tombstone);
            return Ok(());
        }

        // The path may name a directory that existed at the last commit but
        // has since been deleted wholesale; tombstone every formerly
        // tracked file beneath it.
        let under = last_commit_manifest.paths_under(path);
        if under.is_empty() {
            return Err(Error::PathNotFound(path.to_string()));
        }
        for tracked in under {
            index.set(tracked.clone(), IndexEntry::Tombstone);
        }
        Ok(())
    }

    fn stage_file(
        &self,
        path: &str,
        index: &mut Index,
        last_commit_manifest: &Manifest,
        objects: &ObjectStore,
    ) -> Result<()> {
        let contents = self.fs.read_bytes(path)?;
        let (stored, digest_hex) = encode_and_digest(&contents);
        let digest = Digest::from_hex(&digest_hex).expect("codec digest is always 40 hex chars");

        if last_commit_manifest.get(path) == Some(&digest) {
            // Matches the committed content exactly: nothing to stage, and
            // any previously staged (now stale) entry is cleared.
            if let Some(IndexEntry::Digest(stale)) = index.pop(path) {
                if stale != digest {
                    self.remove_payload_if_present(&stale)?;
                }
            }
            return Ok(());
        }

        if let Some(IndexEntry::Digest(previous)) = index.get(path) {
            if previous != digest {
                self.remove_payload_if_present(&previous)?;
            }
        }

        if !objects.exists(&digest) && !self.fs.exists(&self.payload_path(&digest)) {
            self.fs.write_bytes(&self.payload_path(&digest), &stored)?;
        }

        index.set(path, IndexEntry::Digest(digest));
        Ok(())
    }

    /// Stages every workspace path plus a pass over the manifest to catch
    /// deletions.
    pub fn stage_all(
        &self,
        workspace_root: &str,
        index: &mut Index,
        last_commit_manifest: &Manifest,
        ignore: &IgnoreSet,
        objects: &ObjectStore,
    ) -> Result<()> {
        for child in self.fs.list_dir(workspace_root)? {
            let path = if workspace_root.is_empty() {
                child
            } else {
                format!("{}/{}", workspace_root, child)
            };
            if ignore.is_ignored(&path) {
                continue;
            }
            self.stage(&path, index, last_commit_manifest, ignore, objects)?;
        }
        for path in last_commit_manifest.paths() {
            if !self.fs.exists(path) && !ignore.is_ignored(path) {
                index.set(path.clone(), IndexEntry::Tombstone);
            }
        }
        Ok(())
    }

    /// Deletes every staged payload and truncates the index to empty.
    pub fn clean(&self, index: &mut Index) -> Result<()> {
        if self.fs.exists(&self.index_dir) {
            for name in self.fs.list_dir(&self.index_dir)? {
                if name == "index" {
                    continue;
                }
                self.fs.remove_file(&format!("{}/{}", self.index_dir, name))?;
            }
        }
        index.clear();
        self.persist(index)
    }

    /// Removes the named entries (files, or directories recursively) from
    /// `index`, unlinking their staged payloads, then persists (or cleans
    /// if the index is now empty).
    pub fn delete_entries(&self, paths: &[String], index: &mut Index) -> Result<()> {
        for path in paths {
            let matched = index.paths_under(path);
            for matched_path in matched {
                if let Some(IndexEntry::Digest(d)) = index.pop(&matched_path) {
                    self.remove_payload_if_present(&d)?;
                }
            }
        }
        if index.is_empty() {
            self.clean(index)
        } else {
            self.persist(index)
        }
    }
}
