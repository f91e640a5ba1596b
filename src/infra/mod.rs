//! Infrastructure utilities (hashing, compression, filesystem).

pub mod codec;
pub mod fs;
pub mod hash;

pub use codec::{decode, digest, encode, encode_and_digest};
pub use fs::{Fs, FsError, FsResult, MemFs, RealFs};
