//! # Cryptographic Primitives for Thorn
//!
//! Everything security-related in the transaction core flows through here:
//!
//! - **Keccak-256** for signing hashes, transaction ids and addresses.
//! - **secp256k1 ECDSA** with public-key recovery for signatures.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Everything here is a thin, type-safe wrapper around audited
//! implementations (`k256`, `alloy-primitives`). If you're tempted to
//! optimize these functions, please reconsider.

pub mod hash;
pub mod keys;

pub use hash::{keccak, keccak_multi};
pub use keys::{public_key_to_address, recover_address, KeyError, Keypair};
