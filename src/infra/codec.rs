//! Deflate compression and SHA-1 digesting of object byte buffers.
//!
//! Every stored object is addressed by the digest of its *compressed*
//! representation, not its raw content: the digest is computed over exactly
//! the bytes that end up on disk, so an on-disk integrity check reduces to
//! one hash of the file as-is.

use crate::error::{Error, Result};
use crate::infra::hash::sha1;

/// Deflates `data` at maximum compression (zlib-wrapped).
pub fn encode(data: &[u8]) -> Vec<u8> {
    miniz_oxide::deflate::compress_to_vec_zlib(data, 10)
}

/// Inflates zlib-compressed `data`, validating the header first.
///
/// Returns `Error::DecompressionFailed` if the input is empty, too short to
/// contain a zlib header, has an invalid header, or the stream is corrupt or
/// truncated.
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < 2 {
        return Err(Error::DecompressionFailed(format!("{} byte(s)", data.len())));
    }
    if !is_valid_zlib_header(data[0], data[1]) {
        return Err(Error::DecompressionFailed("bad zlib header".to_string()));
    }
    miniz_oxide::inflate::decompress_to_vec_zlib(data)
        .map_err(|_| Error::DecompressionFailed("corrupt or truncated stream".to_string()))
}

/// 40-character lowercase hex SHA-1 digest of `data`.
pub fn digest(data: &[u8]) -> String {
    let bytes = sha1(data);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Encodes `raw` and returns `(stored, digest_of_stored)` in one call, so
/// callers never risk hashing a different buffer than the one they wrote.
pub fn encode_and_digest(raw: &[u8]) -> (Vec<u8>, String) {
    let stored = encode(raw);
    let d = digest(&stored);
    (stored, d)
}

fn is_valid_zlib_header(cmf: u8, flg: u8) -> bool {
    let compression_method = cmf & 0x0F;
    if compression_method != 8 {
        return false;
    }
    let window_size = (cmf >> 4) & 0x0F;
    if window_size > 7 {
        return false;
    }
    let check = (cmf as u16) * 256 + (flg as u16);
    check % 31 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let original = b"Hello, World! This is a test of compression.";
        let compressed = encode(original);
        let decompressed = decode(&compressed).expect("decompression should succeed");
        assert_eq!(decompressed, original);
    }

    #[test]
    fn test_roundtrip_empty() {
        let compressed = encode(b"");
        let decompressed = decode(&compressed).expect("decompression should succeed");
        assert_eq!(decompressed, b"");
    }

    #[test]
    fn test_digest_is_40_lowercase_hex_chars() {
        let d = digest(b"anything at all");
        assert_eq!(d.len(), 40);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_encode_and_digest_consistent_with_separate_calls() {
        let raw = b"hello world";
        let (stored, d) = encode_and_digest(raw);
        assert_eq!(stored, encode(raw));
        assert_eq!(d, digest(&stored));
    }

    #[test]
    fn test_decompress_empty_data_fails() {
        let result = decode(&[]);
        assert!(matches!(result, Err(Error::DecompressionFailed(_))));
    }

    #[test]
    fn test_decompress_corrupted_data_fails() {
        let mut compressed = encode(b"Hello, World!");
        if compressed.len() > 5 {
            compressed[4] ^= 0xFF;
            compressed[5] ^= 0xFF;
        }
        let result = decode(&compressed);
        assert!(matches!(result, Err(Error::DecompressionFailed(_))));
    }

    #[test]
    fn test_decompress_truncated_data_fails() {
        let compressed = encode(b"Hello, World!");
        let truncated = &compressed[..2];
        assert!(matches!(decode(truncated), Err(Error::DecompressionFailed(_))));

        let half_truncated = &compressed[..compressed.len() / 2];
        assert!(matches!(decode(half_truncated), Err(Error::DecompressionFailed(_))));
    }

    #[test]
    fn test_decompress_invalid_header_fails() {
        let invalid = vec![0x00, 0x00, 0x00, 0x00];
        assert!(matches!(decode(&invalid), Err(Error::DecompressionFailed(_))));

        let invalid_checksum = vec![0x78, 0x00];
        assert!(matches!(decode(&invalid_checksum), Err(Error::DecompressionFailed(_))));
    }

    #[test]
    fn test_compress_reduces_size_for_repetitive_data() {
        let original = vec![b'a'; 1000];
        let compressed = encode(&original);
        assert!(compressed.len() < original.len());
    }

    #[test]
    fn test_equal_content_yields_equal_digest() {
        let (_, d1) = encode_and_digest(b"same content");
        let (_, d2) = encode_and_digest(b"same content");
        assert_eq!(d1, d2);
    }
}
