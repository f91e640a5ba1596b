//! Content digest (SHA-1 of a compressed object) representation.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// The length of a SHA-1 hash in bytes.
pub const DIGEST_BYTES: usize = 20;

/// The length of a SHA-1 hash as a hexadecimal string.
pub const DIGEST_HEX_LEN: usize = 40;

/// A 40-character hex SHA-1 digest identifying one stored object (blob,
/// tree, manifest, or commit) by the hash of its compressed bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest {
    bytes: [u8; DIGEST_BYTES],
}

impl Digest {
    /// Parses a 40-character hexadecimal string (case-insensitive).
    pub fn from_hex(hex: &str) -> Result<Self> {
        if hex.len() != DIGEST_HEX_LEN {
            return Err(Error::InvalidDigest(hex.to_string()));
        }

        let mut bytes = [0u8; DIGEST_BYTES];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let high = hex_digit_to_value(chunk[0])
                .ok_or_else(|| Error::InvalidDigest(hex.to_string()))?;
            let low = hex_digit_to_value(chunk[1])
                .ok_or_else(|| Error::InvalidDigest(hex.to_string()))?;
            bytes[i] = (high << 4) | low;
        }

        Ok(Digest { bytes })
    }

    pub fn from_bytes(bytes: [u8; DIGEST_BYTES]) -> Self {
        Digest { bytes }
    }

    /// Always-lowercase, 40-character hex representation.
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(DIGEST_HEX_LEN);
        for byte in &self.bytes {
            hex.push(HEX_CHARS[(byte >> 4) as usize]);
            hex.push(HEX_CHARS[(byte & 0x0f) as usize]);
        }
        hex
    }

    /// A short (7-character) representation, for display purposes only.
    pub fn short(&self) -> String {
        self.to_hex()[..7].to_string()
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_BYTES] {
        &self.bytes
    }
}

const HEX_CHARS: [char; 16] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f',
];

fn hex_digit_to_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.short())
    }
}

impl FromStr for Digest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Digest::from_hex(s)
    }
}
