//! Commit objects: a five-field pointer at a tree, a manifest, and an
//! optional parent.
//!
//! Text grammar: exactly `tree_digest LF manifest_digest LF message LF date
//! LF parent_digest`, where `parent_digest` is empty for a root commit. The
//! message must not itself contain a newline (it is one field among five,
//! not a free-form trailing blob as in the original format this was
//! patterned after).

use crate::error::{Error, Result};
use crate::objects::digest::Digest;

/// A single commit: a snapshot pointer with a message, a timestamp, and at
/// most one parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub tree: Digest,
    pub manifest: Digest,
    pub message: String,
    pub date: String,
    pub parent: Option<Digest>,
}

impl Commit {
    pub fn new(
        tree: Digest,
        manifest: Digest,
        message: impl Into<String>,
        date: impl Into<String>,
        parent: Option<Digest>,
    ) -> Self {
        Commit {
            tree,
            manifest,
            message: message.into(),
            date: date.into(),
            parent,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Serialises to the exact five-field layout.
    pub fn serialize(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n{}",
            self.tree,
            self.manifest,
            self.message,
            self.date,
            self.parent.map(|d| d.to_string()).unwrap_or_default(),
        )
    }

    /// Parses commit text, rejecting anything that does not have exactly
    /// five fields (`Error::MalformedObject`, a corruption-kind error, not a
    /// user error: a commit with the wrong shape signals repository damage).
    pub fn parse(text: &str, locator: &str) -> Result<Self> {
        let fields: Vec<&str> = text.splitn(5, '\n').collect();
        if fields.len() != 5 {
            return Err(Error::MalformedObject {
                locator: locator.to_string(),
                reason: format!("expected 5 fields, found {}", fields.len()),
            });
        }
        let tree = Digest::from_hex(fields[0]).map_err(|_| Error::MalformedObject {
            locator: locator.to_string(),
            reason: format!("invalid tree digest: {:?}", fields[0]),
        })?;
        let manifest = Digest::from_hex(fields[1]).map_err(|_| Error::MalformedObject {
            locator: locator.to_string(),
            reason: format!("invalid manifest digest: {:?}", fields[1]),
        })?;
        let message = fields[2].to_string();
        let date = fields[3].to_string();
        let parent = if fields[4].is_empty() {
            None
        } else {
            Some(Digest::from_hex(fields[4]).map_err(|_| Error::MalformedObject {
                locator: locator.to_string(),
                reason: format!("invalid parent digest: {:?}", fields[4]),
            })?)
        };

        Ok(Commit {
            tree,
            manifest,
            message,
            date,
            parent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
    const D2: &str = "0123456789abcdef0123456789abcdef01234567";
    const D3: &str = "abcdef0123456789abcdef0123456789abcdef01";

    fn digest(hex: &str) -> Digest {
        Digest::from_hex(hex).unwrap()
    }

    #[test]
    fn test_serialize_root_commit() {
        let c = Commit::new(digest(D1), digest(D2), "init", "2026-01-01 10:00:00", None);
        let text = c.serialize();
        assert_eq!(text, format!("{}\n{}\ninit\n2026-01-01 10:00:00\n", D1, D2));
    }

    #[test]
    fn test_serialize_and_parse_roundtrip() {
        let c = Commit::new(
            digest(D1),
            digest(D2),
            "second commit",
            "2026-01-02 11:00:00",
            Some(digest(D3)),
        );
        let text = c.serialize();
        let parsed = Commit::parse(&text, "c").unwrap();
        assert_eq!(parsed, c);
    }

    #[test]
    fn test_is_root() {
        let root = Commit::new(digest(D1), digest(D2), "init", "date", None);
        assert!(root.is_root());
        let child = Commit::new(digest(D1), digest(D2), "next", "date", Some(digest(D3)));
        assert!(!child.is_root());
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        let result = Commit::parse("only\ntwo", "c");
        assert!(matches!(result, Err(Error::MalformedObject { .. })));
    }

    #[test]
    fn test_parse_rejects_invalid_tree_digest() {
        let text = format!("not-a-digest\n{}\nmsg\ndate\n", D2);
        let result = Commit::parse(&text, "c");
        assert!(matches!(result, Err(Error::MalformedObject { .. })));
    }

    #[test]
    fn test_parse_rejects_invalid_parent_digest() {
        let text = format!("{}\n{}\nmsg\ndate\nnot-a-digest", D1, D2);
        let result = Commit::parse(&text, "c");
        assert!(matches!(result, Err(Error::MalformedObject { .. })));
    }

    #[test]
    fn test_parse_empty_message_and_date() {
        let text = format!("{}\n{}\n\n\n", D1, D2);
        let c = Commit::parse(&text, "c").unwrap();
        assert_eq!(c.message, "");
        assert_eq!(c.date, "");
        assert!(c.is_root());
    }
}
