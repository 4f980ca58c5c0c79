//! Signer recovery, transaction identity and proved work.
//!
//! The identity of a transaction is `keccak(signing_hash ‖ signer)`, so it
//! only exists once a signer can be recovered. Recovery is expensive, so
//! every successful result goes through two layers of caching: the
//! per-transaction memo and a [`SignerCache`] keyed by the fingerprint of
//! the full encoding.
//!
//! Failure handling is asymmetric on purpose: [`Transaction::signer`]
//! reports the error, while [`Transaction::id`] and
//! [`Transaction::proved_work`] fold it into sentinel values so that
//! logging and display code never has to handle an error.

use alloy_primitives::{Address, B256, U256};
use tracing::{debug, trace};

use super::builder::Transaction;
use super::error::TxError;
use super::signer_cache::{shared_signer_cache, SignerCache};
use crate::crypto::{keccak, keccak_multi, recover_address, Keypair};

/// Id reported by transactions whose signer can't be recovered.
pub const INVALID_TX_ID: B256 = B256::repeat_byte(0xff);

impl Transaction {
    /// Recovers the address that signed this transaction, consulting the
    /// process-wide signer cache.
    ///
    /// Recovery failures are returned, never cached, and never panic.
    pub fn signer(&self) -> Result<Address, TxError> {
        self.signer_with(shared_signer_cache())
    }

    /// Like [`signer`](Self::signer), against a caller-supplied cache.
    pub fn signer_with(&self, cache: &dyn SignerCache) -> Result<Address, TxError> {
        if let Some(signer) = self.memo.signer.get() {
            return Ok(*signer);
        }

        let fingerprint = keccak(self.to_rlp());
        if let Some(signer) = cache.get(&fingerprint) {
            trace!(%fingerprint, %signer, "signer cache hit");
            return Ok(*self.memo.signer.get_or_init(|| signer));
        }

        let signer = recover_address(&self.signing_hash(), &self.body.signature).map_err(|e| {
            debug!(%fingerprint, error = %e, "signer recovery failed");
            TxError::Recovery(e)
        })?;
        trace!(%fingerprint, %signer, "signer recovered");

        cache.insert(fingerprint, signer);
        Ok(*self.memo.signer.get_or_init(|| signer))
    }

    /// Canonical id: `keccak(signing_hash ‖ signer)`.
    ///
    /// Returns [`INVALID_TX_ID`] when no signer can be recovered. Only a
    /// real id is memoized; the sentinel is recomputed on every call.
    pub fn id(&self) -> B256 {
        if let Some(id) = self.memo.id.get() {
            return *id;
        }
        match self.signer() {
            Ok(signer) => *self.memo.id.get_or_init(|| self.make_id(&signer)),
            Err(_) => INVALID_TX_ID,
        }
    }

    /// Proved work of this transaction: `U256::MAX / id`. Zero when no
    /// signer can be recovered.
    pub fn proved_work(&self) -> U256 {
        match self.signer() {
            Ok(_) => id_to_work(self.id()),
            Err(_) => U256::ZERO,
        }
    }

    /// The work this transaction would prove if `signer` signed it. Lets a
    /// sender search nonces for a cheaper price before signing.
    pub fn evaluate_work(&self, signer: Address) -> U256 {
        id_to_work(self.make_id(&signer))
    }

    fn make_id(&self, signer: &Address) -> B256 {
        keccak_multi(&[self.signing_hash().as_slice(), signer.as_slice()])
    }
}

/// `U256::MAX / id`. The all-zero id can't be divided by; it counts as
/// maximal work.
fn id_to_work(id: B256) -> U256 {
    let id = U256::from_be_bytes(id.0);
    U256::MAX.checked_div(id).unwrap_or(U256::MAX)
}

/// Signs `tx` with `keypair` and returns the signed copy.
///
/// The signature is `r ‖ s ‖ v` over [`Transaction::signing_hash`]. The
/// input transaction is not modified.
///
/// # Example
///
/// ```
/// use thorn_protocol::crypto::Keypair;
/// use thorn_protocol::transaction::{sign_transaction, TransactionBuilder};
///
/// let keypair = Keypair::generate();
/// let tx = TransactionBuilder::new().chain_tag(0xa4).gas(21_000).build();
/// let signed = sign_transaction(&tx, &keypair).unwrap();
///
/// assert_eq!(signed.signer().unwrap(), keypair.address());
/// assert!(!tx.is_signed());
/// ```
pub fn sign_transaction(tx: &Transaction, keypair: &Keypair) -> Result<Transaction, TxError> {
    let signature = keypair.sign_hash(&tx.signing_hash())?;
    Ok(tx.with_signature(signature.to_vec()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyError;
    use crate::transaction::signer_cache::{LruSignerCache, NoopSignerCache};
    use crate::transaction::types::{BlockRef, Clause};
    use crate::transaction::TransactionBuilder;

    const TEST_KEY: &str = "0x7582be841ca040aa940fff6c05773129e135623e41acce3e0b8ba520dc1ae26a";

    fn unsigned_tx(nonce: u64) -> Transaction {
        TransactionBuilder::new()
            .chain_tag(0xa4)
            .nonce(nonce)
            .block_ref(BlockRef::new(10))
            .clause(Clause::new(Some(Address::repeat_byte(0x42))).with_value(U256::from(1u64)))
            .gas(21_000)
            .build()
    }

    fn keypair() -> Keypair {
        Keypair::from_hex(TEST_KEY).unwrap()
    }

    #[test]
    fn signed_tx_recovers_its_signer() {
        let kp = keypair();
        let tx = sign_transaction(&unsigned_tx(1), &kp).unwrap();
        assert_eq!(tx.signer().unwrap(), kp.address());
        assert_eq!(tx.signature().len(), 65);
    }

    #[test]
    fn unsigned_tx_has_no_signer() {
        let tx = unsigned_tx(1);
        assert!(matches!(
            tx.signer(),
            Err(TxError::Recovery(KeyError::InvalidSignatureLength(0)))
        ));
        assert_eq!(tx.id(), INVALID_TX_ID);
        assert_eq!(tx.proved_work(), U256::ZERO);
    }

    #[test]
    fn garbage_signature_is_reported_not_panicked() {
        let tx = unsigned_tx(1).with_signature(vec![0u8; 65]);
        assert!(matches!(tx.signer(), Err(TxError::Recovery(_))));
        assert_eq!(tx.id(), INVALID_TX_ID);
    }

    #[test]
    fn failed_recovery_is_not_memoized() {
        let tx = unsigned_tx(1).with_signature(vec![0u8; 65]);
        let cache = LruSignerCache::with_capacity(4);
        assert!(tx.signer_with(&cache).is_err());
        assert!(cache.is_empty());
        assert!(tx.memo.signer.get().is_none());
        assert_eq!(tx.id(), INVALID_TX_ID);
        assert!(tx.memo.id.get().is_none());
    }

    #[test]
    fn id_is_keccak_of_signing_hash_and_signer() {
        let kp = keypair();
        let tx = sign_transaction(&unsigned_tx(5), &kp).unwrap();
        let expected = keccak_multi(&[tx.signing_hash().as_slice(), kp.address().as_slice()]);
        assert_eq!(tx.id(), expected);
        assert_eq!(tx.id(), tx.id());
    }

    #[test]
    fn different_signers_give_different_ids() {
        let tx = unsigned_tx(5);
        let a = sign_transaction(&tx, &keypair()).unwrap();
        let b = sign_transaction(&tx, &Keypair::generate()).unwrap();
        assert_eq!(a.signing_hash(), b.signing_hash());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn signer_is_written_through_to_cache() {
        let kp = keypair();
        let tx = sign_transaction(&unsigned_tx(2), &kp).unwrap();
        let cache = LruSignerCache::with_capacity(4);

        assert_eq!(tx.signer_with(&cache).unwrap(), kp.address());
        let fingerprint = keccak(tx.to_rlp());
        assert_eq!(cache.get(&fingerprint), Some(kp.address()));
    }

    #[test]
    fn warm_cache_agrees_with_cold_recovery() {
        let kp = keypair();
        let bytes = sign_transaction(&unsigned_tx(3), &kp).unwrap().to_rlp();
        let cache = LruSignerCache::with_capacity(4);

        let cold = Transaction::from_rlp(&bytes).unwrap().signer_with(&cache).unwrap();
        let warm = Transaction::from_rlp(&bytes).unwrap().signer_with(&cache).unwrap();
        let uncached = Transaction::from_rlp(&bytes)
            .unwrap()
            .signer_with(&NoopSignerCache)
            .unwrap();

        assert_eq!(cold, kp.address());
        assert_eq!(warm, cold);
        assert_eq!(uncached, cold);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_hit_skips_recovery() {
        // A planted entry wins over the real signature: proof the lookup
        // happens before recovery.
        let tx = sign_transaction(&unsigned_tx(4), &keypair()).unwrap();
        let cache = LruSignerCache::with_capacity(4);
        let planted = Address::repeat_byte(0xee);
        cache.insert(keccak(tx.to_rlp()), planted);
        assert_eq!(tx.signer_with(&cache).unwrap(), planted);
    }

    #[test]
    fn with_signature_does_not_disturb_original_identity() {
        let kp = keypair();
        let signed = sign_transaction(&unsigned_tx(6), &kp).unwrap();
        let id = signed.id();
        let hash = signed.signing_hash();

        let resigned = signed.with_signature(vec![1u8; 65]);
        assert!(resigned.signer().is_err());

        assert_eq!(signed.id(), id);
        assert_eq!(signed.signing_hash(), hash);
        assert_eq!(signed.signer().unwrap(), kp.address());
    }

    #[test]
    fn high_s_twin_has_same_signer_and_id() {
        let kp = keypair();
        let low = sign_transaction(&unsigned_tx(9), &kp).unwrap();

        let order: U256 = "0xfffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
            .parse()
            .unwrap();
        let mut sig = low.signature().to_vec();
        let s = U256::from_be_slice(&sig[32..64]);
        sig[32..64].copy_from_slice(&(order - s).to_be_bytes::<32>());
        sig[64] ^= 1;
        let high = low.with_signature(sig);

        assert_ne!(high.to_rlp(), low.to_rlp());
        assert_eq!(high.signer_with(&NoopSignerCache).unwrap(), kp.address());
        assert_eq!(high.id(), low.id());
        assert_ne!(high.id(), INVALID_TX_ID);
        assert_eq!(high.proved_work(), low.proved_work());
    }

    #[test]
    fn proved_work_matches_evaluate_work() {
        let kp = keypair();
        let tx = unsigned_tx(7);
        let predicted = tx.evaluate_work(kp.address());
        let signed = sign_transaction(&tx, &kp).unwrap();
        assert_eq!(signed.proved_work(), predicted);
        assert!(predicted > U256::ZERO);
    }

    #[test]
    fn work_is_max_over_id() {
        assert_eq!(id_to_work(B256::ZERO), U256::MAX);
        assert_eq!(id_to_work(B256::with_last_byte(1)), U256::MAX);
        assert_eq!(id_to_work(B256::with_last_byte(2)), U256::MAX / U256::from(2u8));
        assert_eq!(id_to_work(INVALID_TX_ID), U256::from(1u8));
    }

    #[test]
    fn evaluate_work_depends_on_signer() {
        let tx = unsigned_tx(8);
        assert_ne!(
            tx.evaluate_work(Address::repeat_byte(1)),
            tx.evaluate_work(Address::repeat_byte(2))
        );
    }
}
