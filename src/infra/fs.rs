//! Filesystem capability surface.
//!
//! The core never touches `std::fs` directly. Every read or write goes
//! through the `Fs` trait so that tests can run against `MemFs` instead of
//! the real filesystem. Paths crossing this boundary are workspace-relative,
//! forward-slash-separated strings, never native `PathBuf`s.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A typed filesystem failure, preserving the set of POSIX failure modes the
/// core needs to distinguish.
#[derive(Debug)]
pub enum FsError {
    /// Nothing exists at the given path.
    NotFound(String),
    /// The path names a directory where a file was expected.
    IsADirectory(String),
    /// The path names a file where a directory was expected.
    IsNotADirectory(String),
    /// The path already exists.
    AlreadyExists(String),
    /// The parent directory of the given path does not exist.
    NoParent(String),
    /// An I/O error that doesn't map to one of the above.
    Io(std::io::Error),
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsError::NotFound(p) => write!(f, "not found: {}", p),
            FsError::IsADirectory(p) => write!(f, "is a directory: {}", p),
            FsError::IsNotADirectory(p) => write!(f, "is not a directory: {}", p),
            FsError::AlreadyExists(p) => write!(f, "already exists: {}", p),
            FsError::NoParent(p) => write!(f, "parent directory does not exist: {}", p),
            FsError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for FsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FsError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type FsResult<T> = std::result::Result<T, FsError>;

/// Abstract operations on files and directories, keyed by workspace-relative
/// path. Two implementations exist: `RealFs`, backed by `std::fs`, and
/// `MemFs`, an in-memory map used by tests.
pub trait Fs {
    fn create_dir(&self, path: &str) -> FsResult<()>;
    fn remove_dir(&self, path: &str) -> FsResult<()>;
    fn create_file(&self, path: &str) -> FsResult<()>;
    fn remove_file(&self, path: &str) -> FsResult<()>;
    fn exists(&self, path: &str) -> bool;
    fn is_file(&self, path: &str) -> bool;
    fn is_empty(&self, path: &str) -> FsResult<bool>;
    fn write_text(&self, path: &str, contents: &str) -> FsResult<()>;
    fn write_bytes(&self, path: &str, contents: &[u8]) -> FsResult<()>;
    fn read_text(&self, path: &str) -> FsResult<String>;
    fn read_bytes(&self, path: &str) -> FsResult<Vec<u8>>;
    /// Lines of the file, each retaining its trailing `\n` except possibly
    /// the last line if the file does not end in a newline.
    fn read_lines(&self, path: &str) -> FsResult<Vec<String>>;
    /// Immediate children of a directory, names only (no path prefix),
    /// sorted for deterministic iteration.
    fn list_dir(&self, path: &str) -> FsResult<Vec<String>>;
    fn rename(&self, from: &str, to: &str) -> FsResult<()>;
}

fn split_into_lines_preserving_newlines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'\n' {
            lines.push(text[start..=i].to_string());
            start = i + 1;
        }
    }
    if start < text.len() {
        lines.push(text[start..].to_string());
    }
    lines
}

// ---------------------------------------------------------------------
// RealFs
// ---------------------------------------------------------------------

/// `Fs` backed directly by the operating system's filesystem, rooted at a
/// given directory. Writes go through a temp-file-and-rename discipline so a
/// crash mid-write never leaves a half-written file at the target path.
#[derive(Debug, Clone)]
pub struct RealFs {
    root: PathBuf,
}

impl RealFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        RealFs { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn native(&self, path: &str) -> PathBuf {
        let mut p = self.root.clone();
        for component in path.split('/').filter(|s| !s.is_empty()) {
            p.push(component);
        }
        p
    }
}

impl Fs for RealFs {
    fn create_dir(&self, path: &str) -> FsResult<()> {
        let native = self.native(path);
        if native.exists() {
            return Err(FsError::AlreadyExists(path.to_string()));
        }
        match native.parent() {
            Some(parent) if !parent.exists() && parent != self.root => {
                return Err(FsError::NoParent(path.to_string()));
            }
            _ => {}
        }
        fs::create_dir(&native).map_err(FsError::Io)
    }

    fn remove_dir(&self, path: &str) -> FsResult<()> {
        let native = self.native(path);
        if !native.exists() {
            return Err(FsError::NotFound(path.to_string()));
        }
        if !native.is_dir() {
            return Err(FsError::IsNotADirectory(path.to_string()));
        }
        fs::remove_dir(&native).map_err(FsError::Io)
    }

    fn create_file(&self, path: &str) -> FsResult<()> {
        let native = self.native(path);
        if native.exists() {
            return Err(FsError::AlreadyExists(path.to_string()));
        }
        match native.parent() {
            Some(parent) if !parent.exists() && parent != self.root => {
                return Err(FsError::NoParent(path.to_string()));
            }
            _ => {}
        }
        fs::File::create(&native).map(|_| ()).map_err(FsError::Io)
    }

    fn remove_file(&self, path: &str) -> FsResult<()> {
        let native = self.native(path);
        if !native.exists() {
            return Err(FsError::NotFound(path.to_string()));
        }
        if native.is_dir() {
            return Err(FsError::IsADirectory(path.to_string()));
        }
        fs::remove_file(&native).map_err(FsError::Io)
    }

    fn exists(&self, path: &str) -> bool {
        self.native(path).exists()
    }

    fn is_file(&self, path: &str) -> bool {
        self.native(path).is_file()
    }

    fn is_empty(&self, path: &str) -> FsResult<bool> {
        let native = self.native(path);
        if !native.exists() {
            return Err(FsError::NotFound(path.to_string()));
        }
        if native.is_dir() {
            let mut entries = fs::read_dir(&native).map_err(FsError::Io)?;
            Ok(entries.next().is_none())
        } else {
            let meta = fs::metadata(&native).map_err(FsError::Io)?;
            Ok(meta.len() == 0)
        }
    }

    fn write_text(&self, path: &str, contents: &str) -> FsResult<()> {
        self.write_bytes(path, contents.as_bytes())
    }

    fn write_bytes(&self, path: &str, contents: &[u8]) -> FsResult<()> {
        let native = self.native(path);
        match native.parent() {
            Some(parent) if !parent.exists() && parent != self.root => {
                return Err(FsError::NoParent(path.to_string()));
            }
            _ => {}
        }
        let temp_path = {
            let mut temp = native.clone();
            let file_name = native
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "temp".to_string());
            temp.set_file_name(format!(".{}.tmp", file_name));
            temp
        };
        {
            let mut file = fs::File::create(&temp_path).map_err(FsError::Io)?;
            file.write_all(contents).map_err(FsError::Io)?;
            file.sync_all().map_err(FsError::Io)?;
        }
        fs::rename(&temp_path, &native).map_err(FsError::Io)
    }

    fn read_text(&self, path: &str) -> FsResult<String> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes).map_err(|_| {
            FsError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "not valid utf-8",
            ))
        })
    }

    fn read_bytes(&self, path: &str) -> FsResult<Vec<u8>> {
        let native = self.native(path);
        if !native.exists() {
            return Err(FsError::NotFound(path.to_string()));
        }
        if native.is_dir() {
            return Err(FsError::IsADirectory(path.to_string()));
        }
        fs::read(&native).map_err(FsError::Io)
    }

    fn read_lines(&self, path: &str) -> FsResult<Vec<String>> {
        let text = self.read_text(path)?;
        Ok(split_into_lines_preserving_newlines(&text))
    }

    fn list_dir(&self, path: &str) -> FsResult<Vec<String>> {
        let native = self.native(path);
        if !native.exists() {
            return Err(FsError::NotFound(path.to_string()));
        }
        if !native.is_dir() {
            return Err(FsError::IsNotADirectory(path.to_string()));
        }
        let mut names: Vec<String> = fs::read_dir(&native)
            .map_err(FsError::Io)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        Ok(names)
    }

    fn rename(&self, from: &str, to: &str) -> FsResult<()> {
        let native_from = self.native(from);
        let native_to = self.native(to);
        if !native_from.exists() {
            return Err(FsError::NotFound(from.to_string()));
        }
        match native_to.parent() {
            Some(parent) if !parent.exists() && parent != self.root => {
                return Err(FsError::NoParent(to.to_string()));
            }
            _ => {}
        }
        fs::rename(&native_from, &native_to).map_err(FsError::Io)
    }
}

// ---------------------------------------------------------------------
// MemFs
// ---------------------------------------------------------------------

/// `None` marks a directory; `Some(bytes)` marks a file. Keyed by
/// normalised workspace-relative path with no leading or trailing slash.
#[derive(Debug, Default)]
pub struct MemFs {
    entries: RefCell<BTreeMap<String, Option<Vec<u8>>>>,
}

impl MemFs {
    pub fn new() -> Self {
        MemFs {
            entries: RefCell::new(BTreeMap::new()),
        }
    }

    fn normalize(path: &str) -> String {
        path.trim_matches('/').to_string()
    }

    fn parent_of(path: &str) -> Option<String> {
        match path.rsplit_once('/') {
            Some((parent, _)) if !parent.is_empty() => Some(parent.to_string()),
            _ => None,
        }
    }

    fn parent_exists_as_dir(&self, path: &str) -> bool {
        match Self::parent_of(path) {
            None => true,
            Some(parent) => matches!(self.entries.borrow().get(&parent), Some(None)),
        }
    }

    fn has_children(&self, dir: &str) -> bool {
        let prefix = format!("{}/", dir);
        self.entries
            .borrow()
            .keys()
            .any(|k| k.starts_with(&prefix))
    }
}

impl Fs for MemFs {
    fn create_dir(&self, path: &str) -> FsResult<()> {
        let path = Self::normalize(path);
        if self.entries.borrow().contains_key(&path) {
            return Err(FsError::AlreadyExists(path));
        }
        if !self.parent_exists_as_dir(&path) {
            return Err(FsError::NoParent(path));
        }
        self.entries.borrow_mut().insert(path, None);
        Ok(())
    }

    fn remove_dir(&self, path: &str) -> FsResult<()> {
        let path = Self::normalize(path);
        match self.entries.borrow().get(&path) {
            None => return Err(FsError::NotFound(path)),
            Some(Some(_)) => return Err(FsError::IsNotADirectory(path)),
            Some(None) => {}
        }
        self.entries.borrow_mut().remove(&path);
        Ok(())
    }

    fn create_file(&self, path: &str) -> FsResult<()> {
        let path = Self::normalize(path);
        if self.entries.borrow().contains_key(&path) {
            return Err(FsError::AlreadyExists(path));
        }
        if !self.parent_exists_as_dir(&path) {
            return Err(FsError::NoParent(path));
        }
        self.entries.borrow_mut().insert(path, Some(Vec::new()));
        Ok(())
    }

    fn remove_file(&self, path: &str) -> FsResult<()> {
        let path = Self::normalize(path);
        match self.entries.borrow().get(&path) {
            None => return Err(FsError::NotFound(path)),
            Some(None) => return Err(FsError::IsADirectory(path)),
            Some(Some(_)) => {}
        }
        self.entries.borrow_mut().remove(&path);
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        let path = Self::normalize(path);
        self.entries.borrow().contains_key(&path)
    }

    fn is_file(&self, path: &str) -> bool {
        let path = Self::normalize(path);
        matches!(self.entries.borrow().get(&path), Some(Some(_)))
    }

    fn is_empty(&self, path: &str) -> FsResult<bool> {
        let norm = Self::normalize(path);
        match self.entries.borrow().get(&norm) {
            None => Err(FsError::NotFound(norm)),
            Some(Some(bytes)) => Ok(bytes.is_empty()),
            Some(None) => Ok(!self.has_children(&norm)),
        }
    }

    fn write_text(&self, path: &str, contents: &str) -> FsResult<()> {
        self.write_bytes(path, contents.as_bytes())
    }

    fn write_bytes(&self, path: &str, contents: &[u8]) -> FsResult<()> {
        let path = Self::normalize(path);
        if matches!(self.entries.borrow().get(&path), Some(None)) {
            return Err(FsError::IsADirectory(path));
        }
        if !self.parent_exists_as_dir(&path) {
            return Err(FsError::NoParent(path));
        }
        self.entries
            .borrow_mut()
            .insert(path, Some(contents.to_vec()));
        Ok(())
    }

    fn read_text(&self, path: &str) -> FsResult<String> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes).map_err(|_| {
            FsError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "not valid utf-8",
            ))
        })
    }

    fn read_bytes(&self, path: &str) -> FsResult<Vec<u8>> {
        let path = Self::normalize(path);
        match self.entries.borrow().get(&path) {
            None => Err(FsError::NotFound(path)),
            Some(None) => Err(FsError::IsADirectory(path)),
            Some(Some(bytes)) => Ok(bytes.clone()),
        }
    }

    fn read_lines(&self, path: &str) -> FsResult<Vec<String>> {
        let text = self.read_text(path)?;
        Ok(split_into_lines_preserving_newlines(&text))
    }

    fn list_dir(&self, path: &str) -> FsResult<Vec<String>> {
        let norm = Self::normalize(path);
        if !norm.is_empty() {
            match self.entries.borrow().get(&norm) {
                None => return Err(FsError::NotFound(norm)),
                Some(Some(_)) => return Err(FsError::IsNotADirectory(norm)),
                Some(None) => {}
            }
        }
        let prefix = if norm.is_empty() {
            String::new()
        } else {
            format!("{}/", norm)
        };
        let mut names: Vec<String> = self
            .entries
            .borrow()
            .keys()
            .filter_map(|k| {
                let rest = k.strip_prefix(&prefix as &str)?;
                if rest.is_empty() || rest.contains('/') {
                    None
                } else {
                    Some(rest.to_string())
                }
            })
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn rename(&self, from: &str, to: &str) -> FsResult<()> {
        let from = Self::normalize(from);
        let to = Self::normalize(to);
        let value = match self.entries.borrow_mut().remove(&from) {
            None => return Err(FsError::NotFound(from)),
            Some(v) => v,
        };
        if !self.parent_exists_as_dir(&to) {
            self.entries.borrow_mut().insert(from, value);
            return Err(FsError::NoParent(to));
        }
        self.entries.borrow_mut().insert(to, value);
        Ok(())
    }
}
