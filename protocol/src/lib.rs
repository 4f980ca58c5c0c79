// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Thorn Protocol: Transaction Core
//!
//! The consensus-critical transaction model of the Thorn ledger. Every
//! validating node must reproduce what lives in this crate bit-for-bit:
//! which bytes are hashed, who signed them, what a transaction costs and
//! how its fee priority is computed.
//!
//! Thorn transactions are multi-clause: one signature authorizes an ordered
//! batch of calls and contract deployments. Identity is Keccak-256 over the
//! signing hash and the recovered secp256k1 signer. Fees can be discounted
//! by "proved work", a score derived from the transaction id, as long as the
//! transaction references a recent block on the canonical chain.
//!
//! ## Architecture
//!
//! - **config**: Consensus constants (gas costs, work decay) and tunables.
//! - **crypto**: Keccak helpers and secp256k1 keys with signer recovery.
//! - **transaction**: Clauses, the canonical codec, the transaction
//!   aggregate, signer caching, gas and fee rules, admission checks.
//!
//! Contract execution, state storage and networking are someone else's
//! problem: they consume decoded clauses from here.
//!
//! ## Design Philosophy
//!
//! 1. Determinism first. No floats, no wrapping arithmetic, no surprises.
//! 2. Untrusted bytes never panic the node.
//! 3. Immutable values, lazily derived, freely shared between threads.
//! 4. If it touches consensus, it has tests. Plural.

pub mod config;
pub mod crypto;
pub mod transaction;
