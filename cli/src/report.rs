//! JSON view of a decoded transaction.

use alloy_primitives::{Address, B256};
use serde::Serialize;
use thorn_protocol::config::network_name;
use thorn_protocol::transaction::{Clause, Transaction};

/// Everything `decode --json` prints. Derived values that can fail are
/// `null` instead of errors.
#[derive(Debug, Serialize)]
pub struct TxReport {
    pub id: Option<B256>,
    pub signer: Option<Address>,
    pub signing_hash: B256,
    pub chain_tag: u8,
    pub network: String,
    pub nonce: u64,
    pub block_ref: String,
    pub clauses: Vec<Clause>,
    pub gas_price_coef: u8,
    pub gas: u64,
    pub intrinsic_gas: Option<u64>,
    pub depends_on: Option<B256>,
    pub reserved_fields: usize,
    pub size: usize,
    pub signature: String,
}

impl TxReport {
    pub fn new(tx: &Transaction) -> Self {
        let signer = tx.signer().ok();
        Self {
            id: signer.map(|_| tx.id()),
            signer,
            signing_hash: tx.signing_hash(),
            chain_tag: tx.chain_tag(),
            network: network_name(tx.chain_tag()),
            nonce: tx.nonce(),
            block_ref: tx.block_ref().to_string(),
            clauses: tx.clauses(),
            gas_price_coef: tx.gas_price_coef(),
            gas: tx.gas(),
            intrinsic_gas: tx.intrinsic_gas().ok(),
            depends_on: tx.depends_on(),
            reserved_fields: tx.reserved().len(),
            size: tx.size(),
            signature: format!("0x{}", hex::encode(tx.signature())),
        }
    }
}
