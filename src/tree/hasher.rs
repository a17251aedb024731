//! Digest computation for node bytes using SHA2-256 or BLAKE3

use crate::cid::HashAlgorithm;
use crate::types::Digest;
use sha2::{Digest as _, Sha256};

/// Compute the digest of `data` with the given algorithm
///
/// Both supported algorithms produce 32-byte digests, so callers never need
/// to branch on the output length.
pub fn compute_digest(algorithm: HashAlgorithm, data: &[u8]) -> Digest {
    match algorithm {
        HashAlgorithm::Sha2_256 => compute_sha2_256(data),
        HashAlgorithm::Blake3 => compute_blake3(data),
    }
}

/// SHA2-256 of arbitrary bytes
pub fn compute_sha2_256(data: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// BLAKE3 of arbitrary bytes
pub fn compute_blake3(data: &[u8]) -> Digest {
    let mut hasher = blake3::Hasher::new();
    hasher.update(data);
    *hasher.finalize().as_bytes()
}
