//! The transaction aggregate and its fluent builder.
//!
//! A [`Transaction`] is an immutable body plus a handful of lazily computed,
//! write-once values derived from it (signing hash, signer, id, encoded
//! size). Because the body never changes after construction, a derived value
//! is valid forever once it has been computed.
//!
//! The [`TransactionBuilder`] assembles an unsigned transaction. It does not
//! sign: that happens in [`super::signing`], which keeps construction
//! testable without key material.

use std::fmt;
use std::sync::OnceLock;

use alloy_primitives::{Address, Bytes, B256};
use alloy_rlp::{BufMut, Decodable, Encodable};

use super::codec::Body;
use super::error::TxError;
use super::types::{BlockRef, Clause, ReservedField};
use crate::crypto::keccak;

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// Write-once derived values. Each cell is filled on first successful
/// computation and never cleared.
#[derive(Debug, Clone, Default)]
pub(super) struct Memo {
    pub(super) signing_hash: OnceLock<B256>,
    pub(super) signer: OnceLock<Address>,
    pub(super) id: OnceLock<B256>,
    pub(super) size: OnceLock<usize>,
}

/// A Thorn transaction.
///
/// Immutable once constructed. Read accessors hand out copies, so nothing a
/// caller does with a returned value can disturb the body or the memoized
/// values derived from it. Sharing a `Transaction` across validation threads
/// needs no external locking.
///
/// Equality compares bodies only.
#[derive(Clone)]
pub struct Transaction {
    pub(super) body: Body,
    pub(super) memo: Memo,
}

impl Transaction {
    pub(super) fn from_body(body: Body) -> Self {
        Self {
            body,
            memo: Memo::default(),
        }
    }

    /// Chain tag: last byte of the genesis block id of the target network.
    pub fn chain_tag(&self) -> u8 {
        self.body.chain_tag
    }

    /// Sender-chosen nonce. Unlike an account nonce it carries no ordering
    /// meaning; it only varies the id.
    pub fn nonce(&self) -> u64 {
        self.body.nonce
    }

    /// Reference to the block this tx was built against.
    pub fn block_ref(&self) -> BlockRef {
        BlockRef::from_u64(self.body.block_ref)
    }

    /// A copy of the clauses, in execution order.
    pub fn clauses(&self) -> Vec<Clause> {
        self.body.clauses.clone()
    }

    /// Id of the transaction that must be included before this one, if any.
    pub fn depends_on(&self) -> Option<B256> {
        self.body.depends_on
    }

    /// Coefficient in `0..=255` scaling the base gas price.
    pub fn gas_price_coef(&self) -> u8 {
        self.body.gas_price_coef
    }

    /// Gas limit declared by the sender.
    pub fn gas(&self) -> u64 {
        self.body.gas
    }

    /// A copy of the raw `r ‖ s ‖ v` signature. Empty when unsigned.
    pub fn signature(&self) -> Bytes {
        self.body.signature.clone()
    }

    /// `true` when a signature is attached. Says nothing about its validity.
    pub fn is_signed(&self) -> bool {
        !self.body.signature.is_empty()
    }

    /// `true` if the body carries any reserved extension entries.
    pub fn has_reserved_fields(&self) -> bool {
        !self.body.reserved.is_empty()
    }

    /// A copy of the reserved extension entries, verbatim.
    pub fn reserved(&self) -> Vec<ReservedField> {
        self.body.reserved.clone()
    }

    /// Keccak-256 of the body encoded without its signature: the pre-image
    /// a sender signs. Memoized.
    pub fn signing_hash(&self) -> B256 {
        *self
            .memo
            .signing_hash
            .get_or_init(|| keccak(self.body.signing_payload()))
    }

    /// Length in bytes of the canonical encoding. Memoized.
    pub fn size(&self) -> usize {
        *self.memo.size.get_or_init(|| self.body.length())
    }

    /// Returns a new transaction with the same body and `signature`
    /// attached. The receiver is left untouched.
    ///
    /// The signing hash does not cover the signature, so an already computed
    /// one is carried over to the copy.
    pub fn with_signature(&self, signature: impl Into<Bytes>) -> Self {
        let mut body = self.body.clone();
        body.signature = signature.into();
        let copy = Self::from_body(body);
        if let Some(hash) = self.memo.signing_hash.get() {
            let _ = copy.memo.signing_hash.set(*hash);
        }
        copy
    }

    /// Canonical encoding: the wire and storage representation.
    pub fn to_rlp(&self) -> Vec<u8> {
        let out = self.body.encoded();
        let _ = self.memo.size.set(out.len());
        out
    }

    /// Decodes a transaction from exactly one canonical encoding. Trailing
    /// bytes are an error.
    pub fn from_rlp(bytes: &[u8]) -> Result<Self, TxError> {
        let mut buf = bytes;
        let body = Body::decode(&mut buf)?;
        if !buf.is_empty() {
            return Err(TxError::Decode(alloy_rlp::Error::UnexpectedLength));
        }
        let tx = Self::from_body(body);
        let _ = tx.memo.size.set(bytes.len());
        Ok(tx)
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body
    }
}

impl Eq for Transaction {}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("chain_tag", &self.body.chain_tag)
            .field("nonce", &self.body.nonce)
            .field("block_ref", &self.block_ref())
            .field("clauses", &self.body.clauses)
            .field("gas_price_coef", &self.body.gas_price_coef)
            .field("gas", &self.body.gas)
            .field("depends_on", &self.body.depends_on)
            .field("reserved", &self.body.reserved.len())
            .field("signature", &self.body.signature)
            .finish()
    }
}

/// Multi-line summary. Never fails: an unrecoverable signer renders as
/// `N/A` and the id falls back to the invalid-id sentinel.
impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let from = match self.signer() {
            Ok(signer) => signer.to_string(),
            Err(_) => "N/A".to_string(),
        };
        let depends_on = match self.body.depends_on {
            Some(id) => id.to_string(),
            None => "nil".to_string(),
        };

        writeln!(f, "Tx({}, {} bytes)", self.id(), self.size())?;
        writeln!(f, "  From:           {from}")?;
        writeln!(f, "  Clauses:        {}", self.body.clauses.len())?;
        for (i, clause) in self.body.clauses.iter().enumerate() {
            writeln!(f, "    #{i}: {clause}")?;
        }
        writeln!(f, "  GasPriceCoef:   {}", self.body.gas_price_coef)?;
        writeln!(f, "  Gas:            {}", self.body.gas)?;
        writeln!(f, "  ChainTag:       {}", self.body.chain_tag)?;
        writeln!(f, "  BlockRef:       {}", self.block_ref())?;
        writeln!(f, "  DependsOn:      {depends_on}")?;
        writeln!(f, "  ReservedFields: {}", self.body.reserved.len())?;
        writeln!(f, "  Nonce:          {}", self.body.nonce)?;
        write!(f, "  Signature:      0x{}", hex::encode(&self.body.signature))
    }
}

impl Encodable for Transaction {
    fn encode(&self, out: &mut dyn BufMut) {
        self.body.encode(out);
    }

    fn length(&self) -> usize {
        self.size()
    }
}

impl Decodable for Transaction {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        Body::decode(buf).map(Self::from_body)
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned [`Transaction`]s.
///
/// # Usage
///
/// ```
/// use alloy_primitives::{Address, U256};
/// use thorn_protocol::config::CHAIN_TAG_DEVNET;
/// use thorn_protocol::transaction::{BlockRef, Clause, TransactionBuilder};
///
/// let tx = TransactionBuilder::new()
///     .chain_tag(CHAIN_TAG_DEVNET)
///     .block_ref(BlockRef::new(100))
///     .clause(Clause::new(Some(Address::repeat_byte(0x11))).with_value(U256::from(1u64)))
///     .gas(21_000)
///     .nonce(7)
///     .build();
///
/// assert_eq!(tx.intrinsic_gas().unwrap(), 21_000);
/// assert!(!tx.is_signed());
/// ```
///
/// Every field defaults to zero / empty; `depends_on` defaults to `None`.
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    body: Body,
}

impl TransactionBuilder {
    /// Creates a builder with every field zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chain tag of the target network.
    pub fn chain_tag(mut self, tag: u8) -> Self {
        self.body.chain_tag = tag;
        self
    }

    /// Sets the nonce.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.body.nonce = nonce;
        self
    }

    /// Sets the block reference.
    pub fn block_ref(mut self, block_ref: BlockRef) -> Self {
        self.body.block_ref = block_ref.as_u64();
        self
    }

    /// Appends a clause.
    pub fn clause(mut self, clause: Clause) -> Self {
        self.body.clauses.push(clause);
        self
    }

    /// Appends several clauses, keeping their order.
    pub fn clauses(mut self, clauses: impl IntoIterator<Item = Clause>) -> Self {
        self.body.clauses.extend(clauses);
        self
    }

    /// Sets the gas price coefficient.
    pub fn gas_price_coef(mut self, coef: u8) -> Self {
        self.body.gas_price_coef = coef;
        self
    }

    /// Sets the gas limit.
    pub fn gas(mut self, gas: u64) -> Self {
        self.body.gas = gas;
        self
    }

    /// Makes the tx depend on an earlier one.
    pub fn depends_on(mut self, id: B256) -> Self {
        self.body.depends_on = Some(id);
        self
    }

    /// Appends a reserved extension entry.
    pub fn reserved(mut self, field: ReservedField) -> Self {
        self.body.reserved.push(field);
        self
    }

    /// Produces the unsigned transaction.
    pub fn build(self) -> Transaction {
        Transaction::from_body(self.body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    fn sample_tx() -> Transaction {
        TransactionBuilder::new()
            .chain_tag(0x27)
            .nonce(12_345)
            .block_ref(BlockRef::new(42))
            .clause(Clause::new(Some(Address::repeat_byte(0x7a))).with_value(U256::from(10u64)))
            .clause(Clause::new(None).with_data(vec![0x60, 0x00, 0x60]))
            .gas_price_coef(128)
            .gas(100_000)
            .build()
    }

    #[test]
    fn builder_sets_every_field() {
        let dep = B256::repeat_byte(0x01);
        let tx = TransactionBuilder::new()
            .chain_tag(0xa4)
            .nonce(9)
            .block_ref(BlockRef::new(77))
            .clauses(vec![Clause::new(None), Clause::new(None)])
            .gas_price_coef(255)
            .gas(50_000)
            .depends_on(dep)
            .reserved(ReservedField::from_value(b"x"))
            .build();

        assert_eq!(tx.chain_tag(), 0xa4);
        assert_eq!(tx.nonce(), 9);
        assert_eq!(tx.block_ref().number(), 77);
        assert_eq!(tx.clauses().len(), 2);
        assert_eq!(tx.gas_price_coef(), 255);
        assert_eq!(tx.gas(), 50_000);
        assert_eq!(tx.depends_on(), Some(dep));
        assert!(tx.has_reserved_fields());
        assert!(tx.signature().is_empty());
        assert!(!tx.is_signed());
    }

    #[test]
    fn empty_builder_is_all_zero() {
        let tx = TransactionBuilder::new().build();
        assert_eq!(tx.chain_tag(), 0);
        assert_eq!(tx.block_ref(), BlockRef::default());
        assert!(tx.clauses().is_empty());
        assert_eq!(tx.depends_on(), None);
        assert!(!tx.has_reserved_fields());
    }

    #[test]
    fn rlp_roundtrip() {
        let tx = sample_tx().with_signature(vec![0xabu8; 65]);
        let bytes = tx.to_rlp();
        let decoded = Transaction::from_rlp(&bytes).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.size(), bytes.len());
        assert_eq!(decoded.signing_hash(), tx.signing_hash());
    }

    #[test]
    fn from_rlp_rejects_trailing_bytes() {
        let mut bytes = sample_tx().to_rlp();
        bytes.push(0x00);
        assert!(matches!(
            Transaction::from_rlp(&bytes),
            Err(TxError::Decode(_))
        ));
    }

    #[test]
    fn from_rlp_rejects_empty_input() {
        assert!(matches!(Transaction::from_rlp(&[]), Err(TxError::Decode(_))));
    }

    #[test]
    fn size_matches_encoding_length() {
        let tx = sample_tx();
        assert_eq!(tx.size(), tx.to_rlp().len());
        assert_eq!(Encodable::length(&tx), tx.size());
    }

    #[test]
    fn signing_hash_ignores_signature() {
        let tx = sample_tx();
        let a = tx.with_signature(vec![1u8; 65]);
        let b = tx.with_signature(vec![2u8; 65]);
        assert_eq!(a.signing_hash(), b.signing_hash());
        assert_eq!(a.signing_hash(), tx.signing_hash());
        assert_ne!(a.to_rlp(), b.to_rlp());
    }

    #[test]
    fn with_signature_leaves_original_untouched() {
        let tx = sample_tx();
        let before = tx.to_rlp();
        let signed = tx.with_signature(vec![9u8; 65]);
        assert_eq!(tx.to_rlp(), before);
        assert!(tx.signature().is_empty());
        assert_eq!(signed.signature().len(), 65);
        assert_ne!(signed, tx);
    }

    #[test]
    fn with_signature_carries_signing_hash_memo() {
        let tx = sample_tx();
        let hash = tx.signing_hash();
        let signed = tx.with_signature(vec![3u8; 65]);
        assert_eq!(signed.memo.signing_hash.get(), Some(&hash));
        assert!(signed.memo.signer.get().is_none());
        assert!(signed.memo.size.get().is_none());
    }

    #[test]
    fn accessors_return_copies() {
        let tx = sample_tx();
        let mut clauses = tx.clauses();
        clauses.clear();
        assert_eq!(tx.clauses().len(), 2);
    }

    #[test]
    fn trait_codec_matches_inherent_codec() {
        let tx = sample_tx();
        let bytes = alloy_rlp::encode(&tx);
        assert_eq!(bytes, tx.to_rlp());
        let decoded = <Transaction as Decodable>::decode(&mut bytes.as_slice()).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn display_of_unsigned_tx_never_fails() {
        let rendered = sample_tx().to_string();
        assert!(rendered.contains("From:           N/A"));
        assert!(rendered.contains("BlockRef:       42-00000000"));
        assert!(rendered.contains("DependsOn:      nil"));
        assert!(rendered.contains("#1: Clause(to=Create"));
    }
}
