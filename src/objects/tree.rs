//! Tree objects: the listing of one directory's non-ignored children.
//!
//! Text grammar: `kind SP path SP digest`, newline-separated records, no
//! trailing newline after the last record. `kind` is `blob` or `tree`.

use crate::error::{Error, Result};
use crate::objects::digest::Digest;

/// Distinguishes a tree entry pointing at a blob from one pointing at a
/// nested tree. A tagged variant, not a string compared against a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Blob,
    Tree,
}

impl EntryKind {
    fn as_token(&self) -> &'static str {
        match self {
            EntryKind::Blob => "blob",
            EntryKind::Tree => "tree",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "blob" => Some(EntryKind::Blob),
            "tree" => Some(EntryKind::Tree),
            _ => None,
        }
    }
}

/// One record in a tree object: a named child of kind `blob` or `tree`,
/// resolving to another stored object by digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub kind: EntryKind,
    pub path: String,
    pub digest: Digest,
}

/// A directory listing: exactly the non-ignored children of one directory.
/// Nested directories appear as `tree`-kind entries.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new() -> Self {
        Tree {
            entries: Vec::new(),
        }
    }

    /// Builds a tree from already-collected entries, rejecting a duplicate
    /// path as malformed rather than silently keeping the last one.
    pub fn from_entries(entries: Vec<TreeEntry>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.path.as_str()) {
                return Err(Error::DuplicatePath {
                    tree: "<under construction>".to_string(),
                    path: entry.path.clone(),
                });
            }
        }
        Ok(Tree { entries })
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Serialises to the on-disk text grammar (no trailing newline).
    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{} {} {}", e.kind.as_token(), e.path, e.digest))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parses tree text, rejecting a duplicate path as `Error::DuplicatePath`
    /// and a malformed record as `Error::MalformedObject`.
    pub fn parse(text: &str, locator: &str) -> Result<Self> {
        let mut entries = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            let mut parts = line.splitn(3, ' ');
            let kind_token = parts.next().ok_or_else(|| Error::MalformedObject {
                locator: locator.to_string(),
                reason: format!("missing kind in tree record: {:?}", line),
            })?;
            let path = parts.next().ok_or_else(|| Error::MalformedObject {
                locator: locator.to_string(),
                reason: format!("missing path in tree record: {:?}", line),
            })?;
            let digest_hex = parts.next().ok_or_else(|| Error::MalformedObject {
                locator: locator.to_string(),
                reason: format!("missing digest in tree record: {:?}", line),
            })?;

            let kind = EntryKind::from_token(kind_token).ok_or_else(|| Error::MalformedObject {
                locator: locator.to_string(),
                reason: format!("unknown tree entry kind: {:?}", kind_token),
            })?;
            let digest = Digest::from_hex(digest_hex).map_err(|_| Error::MalformedObject {
                locator: locator.to_string(),
                reason: format!("invalid digest in tree record: {:?}", digest_hex),
            })?;

            if !seen.insert(path.to_string()) {
                return Err(Error::DuplicatePath {
                    tree: locator.to_string(),
                    path: path.to_string(),
                });
            }

            entries.push(TreeEntry {
                kind,
                path: path.to_string(),
                digest,
            });
        }

        Ok(Tree { entries })
    }
}
