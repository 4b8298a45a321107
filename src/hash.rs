//! Content addressing for prompt snapshots
//!
//! A commit's hash is the SHA-256 of its exact content bytes, rendered as
//! 64 lowercase hex characters. Nothing else (name, message, timestamp)
//! feeds into it, so identical content always yields the identical hash.

use sha2::{Digest, Sha256};

/// Length of a full hex digest
pub const DIGEST_LEN: usize = 64;

/// Number of hex characters shown to users
pub const SHORT_LEN: usize = 8;

/// Compute the content digest of the given bytes.
pub fn digest(content: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(content.as_ref()))
}

/// Abbreviated form of a hash for display.
pub fn short(hash: &str) -> &str {
    &hash[..SHORT_LEN.min(hash.len())]
}
