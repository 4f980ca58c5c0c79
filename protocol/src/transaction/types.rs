//! Core value types for Thorn transactions.
//!
//! These types form the vocabulary of every transaction on the network.
//! They are immutable once built: "modifying" a [`Clause`] hands back a new
//! one, and a [`BlockRef`] is just eight bytes with a few accessors.

use std::fmt;

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Clause
// ---------------------------------------------------------------------------

/// A single call unit inside a multi-clause transaction.
///
/// `to = None` deploys a contract whose init code is `data`; otherwise the
/// clause calls (or simply pays) the target account.
///
/// # Examples
///
/// ```
/// use alloy_primitives::{Address, U256};
/// use thorn_protocol::transaction::Clause;
///
/// let pay = Clause::new(Some(Address::repeat_byte(0x11))).with_value(U256::from(1_000u64));
/// assert!(!pay.is_contract_creation());
///
/// let deploy = Clause::new(None).with_data(vec![0x60, 0x80]);
/// assert!(deploy.is_contract_creation());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Clause {
    pub(crate) to: Option<Address>,
    pub(crate) value: U256,
    pub(crate) data: Bytes,
}

impl Clause {
    /// Creates a clause with zero value and empty data.
    pub fn new(to: Option<Address>) -> Self {
        Self {
            to,
            value: U256::ZERO,
            data: Bytes::new(),
        }
    }

    /// Returns a copy carrying `value`.
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Returns a copy carrying `data`.
    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }

    /// Target account, or `None` for contract creation.
    pub fn to(&self) -> Option<Address> {
        self.to
    }

    /// Amount transferred to the target.
    pub fn value(&self) -> U256 {
        self.value
    }

    /// Call data or contract init code.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// `true` when the clause deploys a contract.
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let to = match self.to {
            Some(addr) => addr.to_string(),
            None => "Create".to_string(),
        };
        write!(f, "Clause(to={}, value={}, data=0x{})", to, self.value, hex::encode(&self.data))
    }
}

// ---------------------------------------------------------------------------
// BlockRef
// ---------------------------------------------------------------------------

/// Compact 8-byte reference to a block.
///
/// Bytes `0..4` hold the block number (big-endian), bytes `4..8` the next
/// bytes of that block's id. Block ids start with their own number, so a
/// `BlockRef` is simply the first 8 bytes of a block id, and the trailing
/// four bytes are a weak proof that the referenced block exists on the
/// sender's chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockRef([u8; 8]);

impl BlockRef {
    /// A reference to block `number` with a zero id suffix.
    pub fn new(number: u32) -> Self {
        let mut bytes = [0u8; 8];
        bytes[..4].copy_from_slice(&number.to_be_bytes());
        Self(bytes)
    }

    /// The reference embedded in a block id: its first 8 bytes.
    pub fn from_block_id(id: &B256) -> Self {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&id[..8]);
        Self(bytes)
    }

    /// Reinterprets the big-endian `u64` form stored in a tx body.
    pub fn from_u64(value: u64) -> Self {
        Self(value.to_be_bytes())
    }

    /// The big-endian `u64` form stored in a tx body.
    pub fn as_u64(&self) -> u64 {
        u64::from_be_bytes(self.0)
    }

    /// Number of the referenced block.
    pub fn number(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// The raw 8 bytes.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// `true` if `id` starts with this reference.
    pub fn matches(&self, id: &B256) -> bool {
        id.starts_with(&self.0)
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.number(), hex::encode(&self.0[4..]))
    }
}

// ---------------------------------------------------------------------------
// ReservedField
// ---------------------------------------------------------------------------

/// One forward-compatible extension slot.
///
/// Holds a complete, already-encoded RLP item (a string or a nested list)
/// exactly as it appeared on the wire. Decoders that don't understand an
/// entry keep it verbatim so that re-encoding reproduces the original
/// bytes, and therefore the original signing hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservedField(pub(crate) Bytes);

impl ReservedField {
    /// A reserved entry holding the RLP string `value`.
    pub fn from_value(value: &[u8]) -> Self {
        let mut out = Vec::with_capacity(value.len() + 9);
        alloy_rlp::Encodable::encode(value, &mut out);
        Self(out.into())
    }

    /// Wraps an already-encoded item. Fails unless `raw` is exactly one
    /// well-formed RLP item.
    pub fn from_rlp(raw: &[u8]) -> Result<Self, alloy_rlp::Error> {
        let mut buf = raw;
        let field = <Self as alloy_rlp::Decodable>::decode(&mut buf)?;
        if !buf.is_empty() {
            return Err(alloy_rlp::Error::UnexpectedLength);
        }
        Ok(field)
    }

    /// The encoded item, header included.
    pub fn as_rlp(&self) -> &[u8] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
