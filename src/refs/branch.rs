//! Branch tips: named mutable pointers from a branch name to a commit
//! digest, stored one file per branch under `refs/branches/`.

use crate::error::{Error, Result};
use crate::infra::fs::{Fs, FsError};
use crate::objects::digest::Digest;

/// Read/write/create/remove/list over the `refs/branches/<name>` files.
pub struct BranchStore<'a> {
    fs: &'a dyn Fs,
    dir: String,
}

impl<'a> BranchStore<'a> {
    pub fn new(fs: &'a dyn Fs, dir: impl Into<String>) -> Self {
        BranchStore { fs, dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> String {
        format!("{}/{}", self.dir, name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.fs.exists(&self.path_for(name))
    }

    /// The commit digest a branch points to, or `None` for a branch with no
    /// commits yet (an empty tip file, e.g. right after `init` creates
    /// `master` but before the first commit lands).
    pub fn tip(&self, name: &str) -> Result<Option<Digest>> {
        let path = self.path_for(name);
        let text = self.fs.read_text(&path).map_err(|e| match e {
            FsError::NotFound(_) => Error::BranchNotFound(name.to_string()),
            other => Error::Fs(other),
        })?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Digest::from_hex(trimmed)?))
        }
    }

    pub fn set_tip(&self, name: &str, digest: Digest) -> Result<()> {
        self.fs.write_text(&self.path_for(name), &digest.to_string())?;
        Ok(())
    }

    /// Creates a new branch file. Fails if the name is already taken.
    pub fn create(&self, name: &str, tip: Option<Digest>) -> Result<()> {
        if self.exists(name) {
            return Err(Error::BranchAlreadyExists(name.to_string()));
        }
        let text = tip.map(|d| d.to_string()).unwrap_or_default();
        self.fs.write_text(&self.path_for(name), &text)?;
        Ok(())
    }

    /// Removes a branch. The caller is responsible for rejecting removal of
    /// the current branch (`Error::CannotDeleteCurrentBranch`); this store
    /// only knows about ref files, not HEAD.
    pub fn remove(&self, name: &str) -> Result<()> {
        if !self.exists(name) {
            return Err(Error::BranchNotFound(name.to_string()));
        }
        self.fs.remove_file(&self.path_for(name))?;
        Ok(())
    }

    /// All branch names, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.fs.list_dir(&self.dir)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::fs::MemFs;

    const D1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";

    fn digest() -> Digest {
        Digest::from_hex(D1).unwrap()
    }

    fn store(fs: &MemFs) -> BranchStore<'_> {
        fs.create_dir("refs").unwrap();
        BranchStore::new(fs, "refs")
    }

    #[test]
    fn test_create_and_tip_roundtrip() {
        let fs = MemFs::new();
        let s = store(&fs);
        s.create("master", Some(digest())).unwrap();
        assert_eq!(s.tip("master").unwrap(), Some(digest()));
    }

    #[test]
    fn test_create_with_no_tip_is_empty() {
        let fs = MemFs::new();
        let s = store(&fs);
        s.create("master", None).unwrap();
        assert_eq!(s.tip("master").unwrap(), None);
    }

    #[test]
    fn test_create_duplicate_fails() {
        let fs = MemFs::new();
        let s = store(&fs);
        s.create("master", None).unwrap();
        assert!(matches!(
            s.create("master", None),
            Err(Error::BranchAlreadyExists(_))
        ));
    }

    #[test]
    fn test_tip_of_missing_branch_fails() {
        let fs = MemFs::new();
        let s = store(&fs);
        assert!(matches!(s.tip("nope"), Err(Error::BranchNotFound(_))));
    }

    #[test]
    fn test_set_tip_advances() {
        let fs = MemFs::new();
        let s = store(&fs);
        s.create("master", None).unwrap();
        s.set_tip("master", digest()).unwrap();
        assert_eq!(s.tip("master").unwrap(), Some(digest()));
    }

    #[test]
    fn test_remove_missing_fails() {
        let fs = MemFs::new();
        let s = store(&fs);
        assert!(matches!(s.remove("nope"), Err(Error::BranchNotFound(_))));
    }

    #[test]
    fn test_remove_existing() {
        let fs = MemFs::new();
        let s = store(&fs);
        s.create("dev", None).unwrap();
        s.remove("dev").unwrap();
        assert!(!s.exists("dev"));
    }

    #[test]
    fn test_list_sorted() {
        let fs = MemFs::new();
        let s = store(&fs);
        s.create("master", None).unwrap();
        s.create("dev", None).unwrap();
        s.create("alpha", None).unwrap();
        assert_eq!(s.list().unwrap(), vec!["alpha", "dev", "master"]);
    }
}
