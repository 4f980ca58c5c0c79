//! # Hashing Utilities
//!
//! Thorn hashes everything consensus-relevant with Keccak-256, the same
//! pre-standard SHA-3 variant Ethereum uses. Signing hashes, transaction ids,
//! signer-cache fingerprints and addresses all come out of here.
//!
//! The heavy lifting is done by `alloy_primitives::keccak256`; this module
//! adds the multi-part variant so composite pre-images like
//! `signing_hash || signer` don't need a temporary buffer.

use alloy_primitives::{keccak256, Keccak256, B256};

/// Compute the Keccak-256 hash of the input data.
///
/// # Example
///
/// ```
/// use thorn_protocol::crypto::keccak;
///
/// let hash = keccak(b"thorn");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn keccak(data: impl AsRef<[u8]>) -> B256 {
    keccak256(data)
}

/// Hash multiple byte slices together without concatenation overhead.
///
/// Feeding the parts sequentially into one hasher gives the same digest as
/// hashing their concatenation.
pub fn keccak_multi(parts: &[&[u8]]) -> B256 {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize()
}
