//! HEAD: the name of the currently active branch.
//!
//! There is no symbolic-ref indirection and no detached-HEAD state in this
//! model — HEAD always names exactly one branch file under `refs/branches/`.

use crate::error::Result;
use crate::infra::fs::Fs;

/// Reads and writes the `.mygit/head` file.
pub struct HeadStore<'a> {
    fs: &'a dyn Fs,
    path: String,
}

impl<'a> HeadStore<'a> {
    pub fn new(fs: &'a dyn Fs, path: impl Into<String>) -> Self {
        HeadStore {
            fs,
            path: path.into(),
        }
    }

    /// The name of the current branch.
    pub fn head(&self) -> Result<String> {
        Ok(self.fs.read_text(&self.path)?.trim_end().to_string())
    }

    /// Points HEAD at a different branch. Does not validate that the
    /// branch exists; callers enforce that invariant.
    pub fn set_head(&self, branch_name: &str) -> Result<()> {
        self.fs.write_text(&self.path, branch_name)?;
        Ok(())
    }
}
