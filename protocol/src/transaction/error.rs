//! Error types for the transaction core.
//!
//! Every fallible transaction operation returns a [`TxError`]. Codec and gas
//! errors go straight back to the caller; recovery errors are reported by
//! [`super::Transaction::signer`] but absorbed into sentinel values by `id`
//! and `proved_work` so that read-only introspection never fails.

use thiserror::Error;

use crate::crypto::KeyError;

/// Errors produced while decoding, pricing, recovering or admitting a
/// transaction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TxError {
    /// The encoded bytes are not a well-formed transaction.
    #[error("malformed transaction encoding: {0}")]
    Decode(#[from] alloy_rlp::Error),

    /// Summing the intrinsic gas overflowed `u64`.
    #[error("out of gas: intrinsic gas overflows u64")]
    OutOfGas,

    /// The signer could not be recovered from the signature.
    #[error("signer recovery failed: {0}")]
    Recovery(#[from] KeyError),

    /// The tx was signed for a different network.
    #[error("chain tag mismatch: expected 0x{expected:02x}, got 0x{got:02x}")]
    ChainTagMismatch {
        /// Chain tag of the local network.
        expected: u8,
        /// Chain tag carried by the transaction.
        got: u8,
    },

    /// The tx carries reserved fields this rule set doesn't understand.
    #[error("reserved fields are not supported")]
    ReservedFieldsNotSupported,

    /// The declared gas can't even cover the intrinsic cost.
    #[error("intrinsic gas {intrinsic} exceeds declared gas {gas}")]
    IntrinsicGasExceedsGas {
        /// Gas the tx costs before execution.
        intrinsic: u64,
        /// Gas the tx declares.
        gas: u64,
    },
}
