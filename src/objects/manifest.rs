//! Manifest objects: the flat `path -> blob digest` listing of a commit.
//!
//! Text grammar: `path SP digest`, newline-separated records, no trailing
//! newline after the last record. Unlike a tree, a manifest is flat: it
//! covers every recorded blob of the commit regardless of directory depth,
//! so diffs and checkouts that only need "what paths were recorded" don't
//! have to walk the tree.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::objects::digest::Digest;

/// A flat `path -> digest` listing covering every blob recorded by one
/// commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: BTreeMap<String, Digest>,
}

impl Manifest {
    pub fn new() -> Self {
        Manifest {
            entries: BTreeMap::new(),
        }
    }

    pub fn from_entries(entries: BTreeMap<String, Digest>) -> Self {
        Manifest { entries }
    }

    pub fn get(&self, path: &str) -> Option<&Digest> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Digest)> {
        self.entries.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Every recorded path that is `dir` itself or lives underneath it.
    pub fn paths_under(&self, dir: &str) -> Vec<&String> {
        let prefix = format!("{}/", dir);
        self.entries
            .keys()
            .filter(|p| p.as_str() == dir || p.starts_with(&prefix))
            .collect()
    }

    /// Serialises to the on-disk text grammar (no trailing newline), sorted
    /// by path for reproducibility.
    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(|(path, digest)| format!("{} {}", path, digest))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parses manifest text into a manifest map, distinct from the index's
    /// own parser so the two on-disk formats can never be cross-populated.
    pub fn parse(text: &str, locator: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            let (path, digest_hex) = line.rsplit_once(' ').ok_or_else(|| Error::MalformedObject {
                locator: locator.to_string(),
                reason: format!("malformed manifest record: {:?}", line),
            })?;
            let digest = Digest::from_hex(digest_hex).map_err(|_| Error::MalformedObject {
                locator: locator.to_string(),
                reason: format!("invalid digest in manifest record: {:?}", digest_hex),
            })?;
            entries.insert(path.to_string(), digest);
        }
        Ok(Manifest { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
    const D2: &str = "0123456789abcdef0123456789abcdef01234567";

    fn digest(hex: &str) -> Digest {
        Digest::from_hex(hex).unwrap()
    }

    #[test]
    fn test_parse_empty() {
        let m = Manifest::parse("", "m").unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn test_serialize_and_parse_roundtrip() {
        let mut entries = BTreeMap::new();
        entries.insert("readme.md".to_string(), digest(D1));
        entries.insert("src/lib.rs".to_string(), digest(D2));
        let m = Manifest::from_entries(entries);

        let text = m.serialize();
        let parsed = Manifest::parse(&text, "m").unwrap();
        assert_eq!(parsed, m);
    }

    #[test]
    fn test_sorted_by_path() {
        let mut entries = BTreeMap::new();
        entries.insert("z.txt".to_string(), digest(D1));
        entries.insert("a.txt".to_string(), digest(D2));
        let m = Manifest::from_entries(entries);
        let text = m.serialize();
        assert!(text.find("a.txt").unwrap() < text.find("z.txt").unwrap());
    }

    #[test]
    fn test_paths_under() {
        let mut entries = BTreeMap::new();
        entries.insert("src/lib.rs".to_string(), digest(D1));
        entries.insert("src/nested/mod.rs".to_string(), digest(D2));
        entries.insert("readme.md".to_string(), digest(D1));
        let m = Manifest::from_entries(entries);

        let mut under_src: Vec<_> = m.paths_under("src").into_iter().cloned().collect();
        under_src.sort();
        assert_eq!(under_src, vec!["src/lib.rs", "src/nested/mod.rs"]);
    }

    #[test]
    fn test_parse_rejects_malformed_record() {
        let result = Manifest::parse("no-space-here", "m");
        assert!(matches!(result, Err(Error::MalformedObject { .. })));
    }

    #[test]
    fn test_parse_rejects_invalid_digest() {
        let result = Manifest::parse("readme.md not-a-digest", "m");
        assert!(matches!(result, Err(Error::MalformedObject { .. })));
    }

    #[test]
    fn test_get_and_contains() {
        let mut entries = BTreeMap::new();
        entries.insert("readme.md".to_string(), digest(D1));
        let m = Manifest::from_entries(entries);
        assert!(m.contains("readme.md"));
        assert_eq!(m.get("readme.md"), Some(&digest(D1)));
        assert!(!m.contains("missing.txt"));
    }
}
