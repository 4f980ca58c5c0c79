//! Admission checks for incoming transactions.
//!
//! Every transaction entering a pool or proposed in a block should pass
//! [`verify_transaction`] first. The checks are ordered from cheapest to
//! most expensive (byte comparisons before signer recovery) so that clearly
//! invalid transactions waste as little CPU as possible.
//!
//! These are stateless checks only. Balance, nonce replay, expiry and
//! dependency resolution need chain state and belong to the caller.

use alloy_primitives::Address;
use tracing::debug;

use super::builder::Transaction;
use super::error::TxError;

/// Runs the stateless admission checks against a transaction and returns
/// its recovered signer.
///
/// The checks, in order:
///
/// 1. **Chain tag**: must equal `chain_tag` of the local network.
/// 2. **Reserved fields**: must be empty; no extension is defined yet.
/// 3. **Intrinsic gas**: must not overflow and must fit in the declared gas.
/// 4. **Signer**: must be recoverable from the signature.
///
/// # Errors
///
/// Returns the first failing check as a [`TxError`].
pub fn verify_transaction(tx: &Transaction, chain_tag: u8) -> Result<Address, TxError> {
    let result = check(tx, chain_tag);
    if let Err(ref e) = result {
        debug!(error = %e, "transaction rejected");
    }
    result
}

fn check(tx: &Transaction, chain_tag: u8) -> Result<Address, TxError> {
    // 1. Replay protection across networks.
    if tx.chain_tag() != chain_tag {
        return Err(TxError::ChainTagMismatch {
            expected: chain_tag,
            got: tx.chain_tag(),
        });
    }

    // 2. Unknown extensions.
    if tx.has_reserved_fields() {
        return Err(TxError::ReservedFieldsNotSupported);
    }

    // 3. Gas budget.
    let intrinsic = tx.intrinsic_gas()?;
    if intrinsic > tx.gas() {
        return Err(TxError::IntrinsicGasExceedsGas {
            intrinsic,
            gas: tx.gas(),
        });
    }

    // 4. Signature. Most expensive, so last.
    tx.signer()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
