//! # mygit
//!
//! A minimal, local, single-user, content-addressed version control engine.
//!
//! mygit tracks a workspace through four object kinds — blobs, trees,
//! manifests, and commits — all content-addressed by the SHA-1 digest of
//! their *compressed* form, so an on-disk integrity check reduces to
//! re-hashing the stored file as-is. A staging index records pending
//! changes as digests or tombstones; branches are named mutable pointers at
//! a commit; merges are fast-forward only.
//!
//! ## Quick start
//!
//! ```no_run
//! use mygit::{Repository, Result};
//! use mygit::infra::fs::RealFs;
//!
//! fn main() -> Result<()> {
//!     let fs = RealFs::new(".");
//!     let mut repo = Repository::open(&fs)?;
//!
//!     repo.stage("readme.md")?;
//!     repo.commit("update readme")?;
//!
//!     for entry in &repo.status()?.indexed_changes {
//!         println!("{:?}: {}", entry.change, entry.path);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module overview
//!
//! - [`error`] - error types and the `Result` alias
//! - [`repository`] - the `Repository` entry point tying every operation together
//! - [`objects`] - blob, tree, manifest, and commit object kinds
//! - [`refs`] - HEAD and branch tip storage
//! - [`index`] - the staging index and its side directory of blob payloads
//! - [`ignore`] - the recursively-expanded ignore set
//! - [`state`] - the per-invocation state cache
//! - [`status`] - working-tree status computation
//! - [`config`] - `.mygit/config` parsing
//! - [`log`] - tracing setup and log file rotation

pub mod config;
pub mod error;
pub mod ignore;
pub mod index;
pub mod log;
pub mod objects;
pub mod refs;
pub mod repository;
pub mod state;
pub mod status;

pub mod infra;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use ignore::IgnoreSet;
pub use index::{Index, IndexEntry, IndexStore};
pub use objects::{Commit, Digest, EntryKind, Manifest, ObjectStore, Tree, TreeEntry};
pub use refs::{BranchStore, HeadStore};
pub use repository::{LogEntry, Repository};
pub use state::State;
pub use status::{Change, Status, StatusEntry};
