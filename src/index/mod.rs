//! The index: a mapping of workspace-relative path to a staged index entry,
//! plus (in `store`) the side directory of staged-but-not-yet-promoted blob
//! payloads.
//!
//! An entry is a tagged variant, `IndexEntry::Digest` or
//! `IndexEntry::Tombstone`, never a bare string compared against the
//! literal `"deleted"`.

pub mod store;

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::objects::digest::Digest;

pub use store::IndexStore;

const TOMBSTONE_TOKEN: &str = "deleted";

/// One staged change: either the digest of the staged content, or a
/// tombstone marking the path as staged-for-deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexEntry {
    Digest(Digest),
    Tombstone,
}

impl IndexEntry {
    fn to_token(self) -> String {
        match self {
            IndexEntry::Digest(d) => d.to_string(),
            IndexEntry::Tombstone => TOMBSTONE_TOKEN.to_string(),
        }
    }

    fn from_token(token: &str, locator: &str) -> Result<Self> {
        if token == TOMBSTONE_TOKEN {
            Ok(IndexEntry::Tombstone)
        } else {
            Digest::from_hex(token)
                .map(IndexEntry::Digest)
                .map_err(|_| Error::MalformedObject {
                    locator: locator.to_string(),
                    reason: format!("invalid index entry value: {:?}", token),
                })
        }
    }
}

/// The in-memory staged-changes map, `path -> IndexEntry`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    entries: BTreeMap<String, IndexEntry>,
}

impl Index {
    pub fn new() -> Self {
        Index {
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, path: &str) -> Option<IndexEntry> {
        self.entries.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn set(&mut self, path: impl Into<String>, entry: IndexEntry) {
        self.entries.insert(path.into(), entry);
    }

    pub fn pop(&mut self, path: &str) -> Option<IndexEntry> {
        self.entries.remove(path)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexEntry)> {
        self.entries.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Every staged path that is `dir` itself or lives underneath it.
    pub fn paths_under(&self, dir: &str) -> Vec<String> {
        let prefix = format!("{}/", dir);
        self.entries
            .keys()
            .filter(|p| p.as_str() == dir || p.starts_with(&prefix))
            .cloned()
            .collect()
    }

    /// Serialises to the on-disk text grammar (no trailing newline), sorted
    /// by path for reproducibility.
    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(|(path, entry)| format!("{} {}", path, entry.to_token()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parses index text into an index map, distinct from the manifest's
    /// own parser, so the two on-disk formats can never be cross-populated.
    pub fn parse(text: &str, locator: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            let (path, value) = line.rsplit_once(' ').ok_or_else(|| Error::MalformedObject {
                locator: locator.to_string(),
                reason: format!("malformed index record: {:?}", line),
            })?;
            let entry = IndexEntry::from_token(value, locator)?;
            entries.insert(path.to_string(), entry);
        }
        Ok(Index { entries })
    }
}
