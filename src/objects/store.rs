//! Content-addressed object store: a flat directory of files named by the
//! digest of their own (compressed) contents.
//!
//! No two-character shard prefix: a single-user local repository never
//! accumulates enough objects to warrant directory sharding.

use crate::error::{Error, Result};
use crate::infra::fs::{Fs, FsError};
use crate::infra::{decode, encode_and_digest};
use crate::objects::digest::Digest;

/// Put/get/exists over a flat `objects/<digest>` directory, plus the
/// staging-specific promotion from `index/<digest>` into the main store.
pub struct ObjectStore<'a> {
    fs: &'a dyn Fs,
    objects_dir: String,
}

impl<'a> ObjectStore<'a> {
    pub fn new(fs: &'a dyn Fs, objects_dir: impl Into<String>) -> Self {
        ObjectStore {
            fs,
            objects_dir: objects_dir.into(),
        }
    }

    fn path_for(&self, digest: &Digest) -> String {
        format!("{}/{}", self.objects_dir, digest)
    }

    /// Compresses `raw`, computes the digest of the compressed bytes, and
    /// writes it only if not already present. Put is idempotent: a second
    /// call with the same content is a no-op and returns the same digest.
    pub fn put(&self, raw: &[u8]) -> Result<Digest> {
        let (stored, digest_hex) = encode_and_digest(raw);
        let digest = Digest::from_hex(&digest_hex).expect("codec digest is always 40 hex chars");
        let path = self.path_for(&digest);
        if !self.fs.exists(&path) {
            self.fs.write_bytes(&path, &stored)?;
        }
        Ok(digest)
    }

    pub fn exists(&self, digest: &Digest) -> bool {
        self.fs.exists(&self.path_for(digest))
    }

    /// Reads the stored (compressed) bytes of an object.
    pub fn get(&self, digest: &Digest) -> Result<Vec<u8>> {
        let path = self.path_for(digest);
        self.fs.read_bytes(&path).map_err(|e| match e {
            FsError::NotFound(_) => Error::ObjectNotFound(digest.to_string()),
            other => Error::Fs(other),
        })
    }

    /// Decompresses and returns the UTF-8 text of a stored object. An empty
    /// stored file decodes to an empty string rather than erroring.
    pub fn decoded_text(&self, digest: &Digest) -> Result<String> {
        let stored = self.get(digest)?;
        if stored.is_empty() {
            return Ok(String::new());
        }
        let raw = decode(&stored)?;
        String::from_utf8(raw).map_err(|_| Error::InvalidUtf8)
    }

    /// Atomically promotes a blob staged under `index/<digest>` into the
    /// main object store. A no-op (not an error) if the staged payload is
    /// no longer present: it may already have been promoted by a previous
    /// commit pass, or the content was identical to last commit and was
    /// never staged in the first place.
    pub fn rename_from_index(&self, digest: &Digest, index_objects_dir: &str) -> Result<()> {
        let from = format!("{}/{}", index_objects_dir, digest);
        if !self.fs.exists(&from) {
            return Ok(());
        }
        let to = self.path_for(digest);
        if self.fs.exists(&to) {
            self.fs.remove_file(&from)?;
            return Ok(());
        }
        self.fs.rename(&from, &to)?;
        Ok(())
    }
}
