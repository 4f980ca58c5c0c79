// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Thorn Transaction Tool
//!
//! Entry point for the `thorn-tx` binary. Parses CLI arguments, initializes
//! logging and dispatches to the subcommand:
//!
//! - `decode` : decode a transaction and print its fields
//! - `build`  : build (and optionally sign) a transaction, print its hex
//! - `work`   : evaluate the proved work of a transaction under a signer
//! - `version`: print build version information

mod cli;
mod logging;
mod report;

use anyhow::{Context, Result};
use clap::Parser;

use thorn_protocol::crypto::Keypair;
use thorn_protocol::transaction::{
    sign_transaction, verify_transaction, work_to_gas, BlockRef, Transaction, TransactionBuilder,
};

use cli::{Commands, ThornCli};
use report::TxReport;

fn main() -> Result<()> {
    let cli = ThornCli::parse();
    logging::init_logging("thorn_cli=info,thorn_protocol=warn", cli.log_format);

    match cli.command {
        Commands::Decode(args) => decode(args),
        Commands::Build(args) => build(args),
        Commands::Work(args) => work(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Parses hex (with or without `0x`) into a transaction.
fn parse_tx(input: &str) -> Result<Transaction> {
    let bytes = hex::decode(input.trim().trim_start_matches("0x"))
        .context("transaction is not valid hex")?;
    Transaction::from_rlp(&bytes).context("failed to decode transaction")
}

fn decode(args: cli::DecodeArgs) -> Result<()> {
    let tx = parse_tx(&args.tx)?;
    tracing::debug!(size = tx.size(), "transaction decoded");

    if args.json {
        let report = TxReport::new(&tx);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{tx}");
    }

    if let Some(chain_tag) = args.verify {
        let signer = verify_transaction(&tx, chain_tag).context("admission check failed")?;
        tracing::info!(%signer, "transaction passes admission checks");
    }
    Ok(())
}

fn build(args: cli::BuildArgs) -> Result<()> {
    let mut builder = TransactionBuilder::new()
        .chain_tag(args.chain_tag)
        .nonce(args.nonce)
        .block_ref(BlockRef::from_u64(args.block_ref))
        .clauses(args.clauses)
        .gas_price_coef(args.gas_price_coef);
    if let Some(id) = args.depends_on {
        builder = builder.depends_on(id);
    }

    let gas = match args.gas {
        Some(gas) => gas,
        None => builder
            .clone()
            .build()
            .intrinsic_gas()
            .context("clauses overflow the gas counter")?,
    };
    let unsigned = builder.gas(gas).build();

    let tx = match args.key {
        Some(key) => {
            let keypair = Keypair::from_hex(&key).context("invalid signer key")?;
            let signed = sign_transaction(&unsigned, &keypair).context("signing failed")?;
            tracing::info!(signer = %keypair.address(), id = %signed.id(), "transaction signed");
            signed
        }
        None => {
            tracing::info!(signing_hash = %unsigned.signing_hash(), "transaction left unsigned");
            unsigned
        }
    };

    println!("0x{}", hex::encode(tx.to_rlp()));
    Ok(())
}

fn work(args: cli::WorkArgs) -> Result<()> {
    let tx = parse_tx(&args.tx)?;
    let work = tx.evaluate_work(args.signer);
    let gas = work_to_gas(work, args.head);

    println!("work:     {work}");
    println!("work gas: {gas} (at block {})", args.head);
    Ok(())
}

fn print_version() {
    println!("thorn-tx {}", env!("CARGO_PKG_VERSION"));
    println!("rustc    {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
