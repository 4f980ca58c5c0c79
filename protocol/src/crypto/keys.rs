//! # Key Management
//!
//! secp256k1 keypairs, transaction-hash signing and public-key recovery.
//!
//! Thorn transactions don't carry the sender's address or public key. The
//! sender is whoever produced the 65-byte recoverable ECDSA signature over the
//! signing hash, and validators get the address back by *recovering* the
//! public key from `(hash, signature)`. That makes recovery the single most
//! expensive thing a validator does per transaction, which is why the
//! transaction module caches its results.
//!
//! ## Signature layout
//!
//! `r (32 bytes) || s (32 bytes) || v (1 byte)`, where `v` is the raw
//! recovery id (0 or 1 in practice), not Ethereum's legacy 27/28. Signing
//! always emits low `s`; recovery accepts either half.
//!
//! ## Addresses
//!
//! An address is the last 20 bytes of `keccak256(uncompressed_pubkey[1..])`,
//! exactly as on Ethereum.
//!
//! ## Security considerations
//!
//! - Key bytes are never logged. `Debug` prints the address only.
//! - Signing is RFC 6979 deterministic with low-S normalization.

use std::fmt;

use alloy_primitives::{Address, B256};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use thiserror::Error;

use super::hash::keccak;

/// Length of a recoverable signature: `r || s || v`.
pub const SIGNATURE_LENGTH: usize = 65;

/// Length of a secp256k1 secret key.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Errors that can occur during key operations and signer recovery.
///
/// Deliberately vague about secret material; explicit about signature shape,
/// since a signature is public anyway.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid signature length: expected {SIGNATURE_LENGTH} bytes, got {0}")]
    InvalidSignatureLength(usize),

    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("malformed signature: r or s out of range")]
    MalformedSignature,

    #[error("public key recovery failed")]
    RecoveryFailed,

    #[error("signing failed")]
    SigningFailed,
}

/// A secp256k1 keypair able to sign Thorn transactions.
///
/// Intentionally not `Serialize`: exporting a private key should be a
/// deliberate call to [`Keypair::secret_key_bytes`], not a side effect of
/// dumping some struct to JSON.
///
/// # Examples
///
/// ```
/// use thorn_protocol::crypto::{keccak, recover_address, Keypair};
///
/// let kp = Keypair::generate();
/// let hash = keccak(b"send 100 THN to alice");
/// let sig = kp.sign_hash(&hash).unwrap();
/// assert_eq!(recover_address(&hash, &sig).unwrap(), kp.address());
/// ```
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Reconstruct a keypair from raw 32-byte secret key material.
    ///
    /// Fails if the bytes are zero or not below the curve order.
    pub fn from_bytes(secret_key_bytes: &[u8]) -> Result<Self, KeyError> {
        if secret_key_bytes.len() != SECRET_KEY_LENGTH {
            return Err(KeyError::InvalidSecretKey);
        }
        let signing_key =
            SigningKey::from_slice(secret_key_bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self { signing_key })
    }

    /// Reconstruct a keypair from a hex-encoded secret key (`0x` optional).
    ///
    /// Convenient for devnet tooling. Please don't keep raw hex keys in
    /// config files anywhere that matters.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(stripped).map_err(|_| KeyError::InvalidSecretKey)?;
        Self::from_bytes(&bytes)
    }

    /// Exports the raw 32-byte secret key. Handle with extreme care.
    pub fn secret_key_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.signing_key.to_bytes().into()
    }

    /// The public verifying key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// The account address controlled by this keypair.
    pub fn address(&self) -> Address {
        public_key_to_address(self.verifying_key())
    }

    /// Sign a 32-byte hash, producing a 65-byte recoverable signature.
    ///
    /// The input is used as the ECDSA pre-hash directly; no further hashing
    /// is applied.
    pub fn sign_hash(&self, hash: &B256) -> Result<[u8; SIGNATURE_LENGTH], KeyError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(hash.as_slice())
            .map_err(|_| KeyError::SigningFailed)?;

        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte();
        Ok(out)
    }
}

impl Clone for Keypair {
    /// Cloning a keypair is allowed but should make you uncomfortable.
    fn clone(&self) -> Self {
        Self {
            signing_key: self.signing_key.clone(),
        }
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair(address={})", self.address())
    }
}

impl PartialEq for Keypair {
    /// Compared by address, never by secret bytes.
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for Keypair {}

/// Derive the account address of a secp256k1 public key.
pub fn public_key_to_address(key: &VerifyingKey) -> Address {
    let point = key.as_affine().to_encoded_point(false);
    // Skip the 0x04 SEC1 tag; hash the raw X || Y coordinates.
    let hash = keccak(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Recover the signer address from a hash and a 65-byte `r || s || v`
/// signature.
///
/// Both halves of the `s` range are accepted: a high-S signature recovers
/// the same signer as its low-S twin `(r, n - s, v ^ 1)`.
///
/// Never panics on malformed input: wrong length, out-of-range scalars,
/// bad recovery ids and points that don't decompress are all reported as
/// [`KeyError`]s.
pub fn recover_address(hash: &B256, signature: &[u8]) -> Result<Address, KeyError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(KeyError::InvalidSignatureLength(signature.len()));
    }

    let v = signature[64];
    let mut recovery_id = RecoveryId::from_byte(v).ok_or(KeyError::InvalidRecoveryId(v))?;
    let mut sig =
        Signature::from_slice(&signature[..64]).map_err(|_| KeyError::MalformedSignature)?;

    // k256 only verifies low-S. `(r, -s)` recovers through `-R`, whose y
    // parity is the opposite one.
    if let Some(normalized) = sig.normalize_s() {
        sig = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let key = VerifyingKey::recover_from_prehash(hash.as_slice(), &sig, recovery_id)
        .map_err(|_| KeyError::RecoveryFailed)?;
    Ok(public_key_to_address(&key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    /// secp256k1 group order.
    fn curve_order() -> U256 {
        "0xfffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
            .parse()
            .unwrap()
    }

    /// Same signature with `s` replaced by `n - s` and the parity flipped.
    fn high_s_twin(sig: &[u8; SIGNATURE_LENGTH]) -> [u8; SIGNATURE_LENGTH] {
        let s = U256::from_be_slice(&sig[32..64]);
        let mut twin = *sig;
        twin[32..64].copy_from_slice(&(curve_order() - s).to_be_bytes::<32>());
        twin[64] ^= 1;
        twin
    }

    fn fixed_keypair() -> Keypair {
        Keypair::from_hex("0x7582be841ca040aa940fff6c05773129e135623e41acce3e0b8ba520dc1ae26a")
            .unwrap()
    }

    #[test]
    fn sign_and_recover_roundtrip() {
        let kp = Keypair::generate();
        let hash = keccak(b"payload");
        let sig = kp.sign_hash(&hash).unwrap();
        assert_eq!(recover_address(&hash, &sig).unwrap(), kp.address());
    }

    #[test]
    fn recovery_id_is_zero_or_one() {
        let kp = fixed_keypair();
        let sig = kp.sign_hash(&keccak(b"v")).unwrap();
        assert!(sig[64] <= 1);
    }

    #[test]
    fn signing_is_deterministic() {
        let kp = fixed_keypair();
        let hash = keccak(b"same message");
        assert_eq!(kp.sign_hash(&hash).unwrap(), kp.sign_hash(&hash).unwrap());
    }

    #[test]
    fn recovery_with_other_hash_gives_other_address() {
        let kp = fixed_keypair();
        let sig = kp.sign_hash(&keccak(b"original")).unwrap();
        let recovered = recover_address(&keccak(b"tampered"), &sig);
        // Either recovery fails or it yields some unrelated key.
        assert_ne!(recovered.ok(), Some(kp.address()));
    }

    #[test]
    fn high_s_signature_recovers_same_signer() {
        let kp = fixed_keypair();
        for msg in [&b"first"[..], b"second", b"third"] {
            let hash = keccak(msg);
            let sig = kp.sign_hash(&hash).unwrap();
            let twin = high_s_twin(&sig);
            assert!(U256::from_be_slice(&twin[32..64]) > curve_order() / U256::from(2u8));
            assert_ne!(twin, sig);
            assert_eq!(recover_address(&hash, &twin).unwrap(), kp.address());
        }
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = recover_address(&keccak(b"x"), &[0u8; 64]).unwrap_err();
        assert_eq!(err, KeyError::InvalidSignatureLength(64));
    }

    #[test]
    fn zero_scalars_are_rejected() {
        let mut sig = [0u8; SIGNATURE_LENGTH];
        sig[64] = 0;
        assert_eq!(
            recover_address(&keccak(b"x"), &sig).unwrap_err(),
            KeyError::MalformedSignature
        );
    }

    #[test]
    fn bad_recovery_id_is_rejected() {
        let kp = fixed_keypair();
        let mut sig = kp.sign_hash(&keccak(b"x")).unwrap();
        sig[64] = 27;
        assert_eq!(
            recover_address(&keccak(b"x"), &sig).unwrap_err(),
            KeyError::InvalidRecoveryId(27)
        );
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert_eq!(Keypair::from_hex("zz").unwrap_err(), KeyError::InvalidSecretKey);
        assert_eq!(Keypair::from_hex("00").unwrap_err(), KeyError::InvalidSecretKey);
        assert_eq!(
            Keypair::from_hex(&"00".repeat(32)).unwrap_err(),
            KeyError::InvalidSecretKey
        );
    }

    #[test]
    fn secret_key_roundtrip() {
        let kp = Keypair::generate();
        let restored = Keypair::from_bytes(&kp.secret_key_bytes()).unwrap();
        assert_eq!(kp, restored);
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let kp = fixed_keypair();
        let debug = format!("{:?}", kp);
        assert!(!debug.contains("7582be84"));
        assert!(debug.starts_with("Keypair(address="));
    }
}
