//! # CLI Interface
//!
//! Defines the command-line argument structure for `thorn-tx` using `clap`
//! derive. Four subcommands: `decode`, `build`, `work` and `version`.

use alloy_primitives::{Address, B256, U256};
use clap::{Args, Parser, Subcommand};
use thorn_protocol::config::CHAIN_TAG_DEVNET;
use thorn_protocol::transaction::Clause;

use crate::logging::LogFormat;

/// Thorn transaction tool.
///
/// Builds, signs and inspects transactions in their canonical encoding.
/// Results go to stdout, logs to stderr.
#[derive(Parser, Debug)]
#[command(
    name = "thorn-tx",
    about = "Build, sign and inspect Thorn transactions",
    version,
    propagate_version = true
)]
pub struct ThornCli {
    /// Log output format.
    #[arg(long, global = true, env = "THORN_LOG_FORMAT", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a hex-encoded transaction and print its fields.
    Decode(DecodeArgs),
    /// Build a transaction, optionally signing it, and print its encoding.
    Build(BuildArgs),
    /// Evaluate the proved work a transaction would have under a signer.
    Work(WorkArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `decode` subcommand.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Canonical encoding, hex, with or without `0x`.
    pub tx: String,

    /// Print a JSON object instead of the text summary.
    #[arg(long)]
    pub json: bool,

    /// Also run the admission checks against this chain tag.
    #[arg(long, value_parser = parse_u8)]
    pub verify: Option<u8>,
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Chain tag of the target network.
    #[arg(long, env = "THORN_CHAIN_TAG", value_parser = parse_u8, default_value_t = CHAIN_TAG_DEVNET)]
    pub chain_tag: u8,

    /// Nonce.
    #[arg(long, default_value_t = 0)]
    pub nonce: u64,

    /// Block reference: a 32-byte block id (its first 8 bytes are used) or
    /// a bare block number.
    #[arg(long, value_parser = parse_block_ref, default_value = "0")]
    pub block_ref: u64,

    /// Clause as `TO[:VALUE[:DATA]]`. `TO` is an address or `create`;
    /// `VALUE` is decimal or `0x` hex; `DATA` is hex. Repeatable, in order.
    #[arg(long = "clause", value_parser = parse_clause)]
    pub clauses: Vec<Clause>,

    /// Gas price coefficient (0..=255).
    #[arg(long, default_value_t = 0)]
    pub gas_price_coef: u8,

    /// Gas limit. Defaults to the intrinsic gas of the clauses.
    #[arg(long)]
    pub gas: Option<u64>,

    /// Id of a transaction that must be included first.
    #[arg(long)]
    pub depends_on: Option<B256>,

    /// Hex secp256k1 secret key to sign with. Unsigned when omitted.
    ///
    /// **Never pass this flag on a shared machine**: prefer the environment
    /// variable.
    #[arg(long, env = "THORN_SIGNER_KEY", hide_env_values = true)]
    pub key: Option<String>,
}

/// Arguments for the `work` subcommand.
#[derive(Args, Debug)]
pub struct WorkArgs {
    /// Canonical encoding, hex, with or without `0x`.
    pub tx: String,

    /// Address assumed to sign the transaction.
    #[arg(long)]
    pub signer: Address,

    /// Head block number used to convert work into gas.
    #[arg(long, default_value_t = 0)]
    pub head: u32,
}

// ---------------------------------------------------------------------------
// Value parsers
// ---------------------------------------------------------------------------

/// Parses a `u8` given in decimal or `0x` hex.
pub fn parse_u8(s: &str) -> Result<u8, String> {
    match s.strip_prefix("0x") {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    }
    .map_err(|e| format!("invalid byte '{s}': {e}"))
}

/// Parses a block id (first 8 bytes used) or a block number.
pub fn parse_block_ref(s: &str) -> Result<u64, String> {
    if s.starts_with("0x") && s.len() == 66 {
        let id: B256 = s.parse().map_err(|e| format!("invalid block id '{s}': {e}"))?;
        return Ok(thorn_protocol::transaction::BlockRef::from_block_id(&id).as_u64());
    }
    let number: u32 = s
        .parse()
        .map_err(|e| format!("invalid block number '{s}': {e}"))?;
    Ok(thorn_protocol::transaction::BlockRef::new(number).as_u64())
}

/// Parses `TO[:VALUE[:DATA]]`.
pub fn parse_clause(s: &str) -> Result<Clause, String> {
    let mut parts = s.splitn(3, ':');
    let to = match parts.next() {
        Some("create") | Some("") => None,
        Some(addr) => Some(
            addr.parse::<Address>()
                .map_err(|e| format!("invalid clause target '{addr}': {e}"))?,
        ),
        None => None,
    };

    let mut clause = Clause::new(to);
    if let Some(value) = parts.next().filter(|v| !v.is_empty()) {
        let value = value
            .parse::<U256>()
            .map_err(|e| format!("invalid clause value '{value}': {e}"))?;
        clause = clause.with_value(value);
    }
    if let Some(data) = parts.next().filter(|d| !d.is_empty()) {
        let bytes = hex::decode(data.trim_start_matches("0x"))
            .map_err(|e| format!("invalid clause data '{data}': {e}"))?;
        clause = clause.with_data(bytes);
    }
    Ok(clause)
}
