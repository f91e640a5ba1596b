//! Content-addressed object kinds: blob, tree, manifest, commit.
//!
//! Every object is compressed before it is hashed and stored, so the digest
//! names the on-disk (compressed) byte image, not the raw content: an
//! on-disk integrity check reduces to one hash of the file as-is.

pub mod commit;
pub mod digest;
pub mod manifest;
pub mod store;
pub mod tree;

pub use commit::Commit;
pub use digest::Digest;
pub use manifest::Manifest;
pub use store::ObjectStore;
pub use tree::{EntryKind, Tree, TreeEntry};
