//! Deterministic content identity (spec §4.2).
//!
//! Configuration and the normalized questionnaire get a 256-bit digest
//! (SHA-256) over a canonical byte serialization; individual chunk payloads
//! get a cheaper 128-bit digest (BLAKE3, truncated). Map-key ordering in the
//! canonical form is lexicographic, which `serde_json::Value`'s default
//! `Map` (no `preserve_order` feature) already gives us for free.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::core::errors::{PipelineError, Result};

/// Serializes `value` to canonical JSON bytes: sorted object keys, no
/// incidental whitespace. Any `Value` produced without the `preserve_order`
/// feature already stores object members in a `BTreeMap`, so `to_vec`
/// naturally emits them in lexicographic order.
pub fn canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let json = serde_json::to_value(value)
        .map_err(|e| PipelineError::internal(format!("canonicalization failed: {e}")))?;
    serde_json::to_vec(&json)
        .map_err(|e| PipelineError::internal(format!("canonicalization failed: {e}")))
}

/// 256-bit SHA-256 digest of `value`'s canonical bytes, hex-encoded.
pub fn content_hash_256<T: Serialize>(value: &T) -> Result<String> {
    let bytes = canonical_bytes(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex_encode(&hasher.finalize()))
}

/// 128-bit BLAKE3 digest of raw bytes, hex-encoded. Used for chunk content,
/// where a cheaper digest than SHA-256 suffices because chunk hashes are
/// never compared against an externally declared value.
pub fn content_hash_128(bytes: &[u8]) -> String {
    let full = blake3::hash(bytes);
    hex_encode(&full.as_bytes()[..16])
}

/// Compares a computed hash against a declared one, case-insensitively.
pub fn verify_hash(expected: &str, actual: &str) -> Result<()> {
    if expected.eq_ignore_ascii_case(actual) {
        Ok(())
    } else {
        Err(PipelineError::hash_mismatch(
            "hash verification failed",
            expected,
            actual,
        ))
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(out, "{byte:02x}").expect("writing to a String never fails");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hash_is_stable_across_repeated_calls() {
        let value = json!({"b": 2, "a": 1});
        assert_eq!(
            content_hash_256(&value).unwrap(),
            content_hash_256(&value).unwrap()
        );
    }

    #[test]
    fn key_order_does_not_affect_hash() {
        let a = json!({"a": 1, "b": 2});
        let b = json!({"b": 2, "a": 1});
        assert_eq!(content_hash_256(&a).unwrap(), content_hash_256(&b).unwrap());
    }

    #[test]
    fn chunk_hash_is_128_bits_hex() {
        let digest = content_hash_128(b"some chunk text");
        assert_eq!(digest.len(), 32);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn verify_hash_is_case_insensitive() {
        verify_hash("ABCDEF", "abcdef").unwrap();
        assert!(verify_hash("abcdef", "000000").is_err());
    }
}
