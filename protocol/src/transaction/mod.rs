//! # Transaction Module
//!
//! Representation, canonical encoding, identity, signing and pricing of
//! Thorn transactions. Every clause executed on the ledger arrives inside a
//! [`Transaction`].
//!
//! ## Architecture
//!
//! ```text
//! types.rs        Value types: Clause, BlockRef, ReservedField
//! codec.rs        Canonical RLP codec of the transaction body
//! builder.rs      Transaction aggregate + fluent TransactionBuilder
//! signer_cache.rs Bounded LRU of recovered signers
//! signing.rs      Signer recovery, id, proved work, sign_transaction
//! gas.rs          Intrinsic gas, gas price, proved-work discount
//! verification.rs Stateless admission checks
//! error.rs        TxError
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: assemble an unsigned tx with [`TransactionBuilder`].
//! 2. **Sign**: [`sign_transaction`] returns a signed copy.
//! 3. **Encode**: [`Transaction::to_rlp`] produces the wire bytes.
//! 4. **Admit**: receivers decode with [`Transaction::from_rlp`] and run
//!    [`verify_transaction`].
//! 5. **Price**: block producers order by
//!    [`Transaction::overall_gas_price`].
//!
//! ## Design Decisions
//!
//! - A transaction never mutates. Attaching a signature produces a new one.
//! - Derived values (signing hash, signer, id, size) are memoized in
//!   `OnceLock` cells. Concurrent first access may compute twice; both
//!   threads get the same answer.
//! - The id depends on the signer, so an unsigned tx has no id. It reports
//!   [`INVALID_TX_ID`] instead of failing.
//! - Unknown reserved fields survive decode/encode byte-for-byte.

pub mod builder;
pub mod codec;
pub mod error;
pub mod gas;
pub mod signer_cache;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::{Transaction, TransactionBuilder};
pub use error::TxError;
pub use gas::{data_gas, intrinsic_gas, work_to_gas, BlockIdLookup};
pub use signer_cache::{shared_signer_cache, LruSignerCache, NoopSignerCache, SignerCache};
pub use signing::{sign_transaction, INVALID_TX_ID};
pub use types::{BlockRef, Clause, ReservedField};
pub use verification::verify_transaction;
