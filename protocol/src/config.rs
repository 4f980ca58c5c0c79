//! # Protocol Configuration & Constants
//!
//! Every consensus number in Thorn lives here. If you're hardcoding a gas
//! cost somewhere else, you're doing it wrong and you owe the team coffee.
//!
//! The gas and work constants below are consensus-visible: every validating
//! node must agree on them bit-for-bit or the chain forks. Changing them is a
//! hard fork, full stop.

// ---------------------------------------------------------------------------
// Chain Tags
// ---------------------------------------------------------------------------

/// Chain tag of the main network. The chain tag is the last byte of the
/// genesis block id, so a tx signed for one network can't be replayed on
/// another.
pub const CHAIN_TAG_MAINNET: u8 = 0x4a;

/// Chain tag of the public test network.
pub const CHAIN_TAG_TESTNET: u8 = 0x27;

/// Chain tag used by local dev chains and the test-suite.
pub const CHAIN_TAG_DEVNET: u8 = 0xa4;

// ---------------------------------------------------------------------------
// Intrinsic Gas
// ---------------------------------------------------------------------------

/// Flat cost every transaction pays, regardless of its clauses.
pub const TX_GAS: u64 = 5_000;

/// Cost of a clause that calls an existing account or contract.
///
/// Together with [`TX_GAS`] this adds up to Ethereum's 21,000 for a plain
/// value transfer, which keeps single-clause txs price-compatible.
pub const CLAUSE_GAS: u64 = 21_000 - TX_GAS;

/// Cost of a clause that deploys a contract (`to` is absent).
pub const CLAUSE_GAS_CONTRACT_CREATION: u64 = 53_000 - TX_GAS;

/// Cost per zero byte of clause data.
pub const TX_DATA_ZERO_GAS: u64 = 4;

/// Cost per non-zero byte of clause data.
pub const TX_DATA_NON_ZERO_GAS: u64 = 68;

// ---------------------------------------------------------------------------
// Proved Work
// ---------------------------------------------------------------------------

/// Maximum distance, in blocks, between a tx's block reference and the head
/// for its proved work to count towards the overall gas price. Anything
/// older (or unverifiable) pays the plain gas price.
pub const MAX_TX_WORK_DELAY: u32 = 30;

/// Target block interval in seconds. Used to convert a block number into
/// chain-time months for the work decay.
pub const BLOCK_INTERVAL: u64 = 10;

/// Units of proved work exchanged for one unit of gas.
pub const WORK_PER_GAS: u64 = 1_000;

/// Monthly decay of proved work, as a `numerator / denominator` pair.
/// Hardware gets ~4% better at hashing every month (Moore's law, more or
/// less), so the same work buys ~4% less gas.
pub const WORK_DECAY_NUMERATOR: u64 = 100;

/// See [`WORK_DECAY_NUMERATOR`].
pub const WORK_DECAY_DENOMINATOR: u64 = 104;

/// Seconds in one chain-time month for the work decay.
pub const SECONDS_PER_MONTH: u64 = 3_600 * 24 * 30;

// ---------------------------------------------------------------------------
// Signer Cache
// ---------------------------------------------------------------------------

/// Default number of recovered signers the process-wide cache remembers.
pub const SIGNER_CACHE_SIZE: usize = 1_024;

/// Tunables for a [`crate::transaction::LruSignerCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignerCacheConfig {
    /// Maximum number of entries. Zero is bumped to one; an LRU with no
    /// slots is just a slower no-op cache.
    pub capacity: usize,
}

impl Default for SignerCacheConfig {
    fn default() -> Self {
        Self {
            capacity: SIGNER_CACHE_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Returns a friendly name for a chain tag, mainly for logging.
/// Unknown tags get a hex dump.
pub fn network_name(chain_tag: u8) -> String {
    match chain_tag {
        CHAIN_TAG_MAINNET => "mainnet".to_string(),
        CHAIN_TAG_TESTNET => "testnet".to_string(),
        CHAIN_TAG_DEVNET => "devnet".to_string(),
        other => format!("unknown(0x{:02x})", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_tags_are_distinct() {
        assert_ne!(CHAIN_TAG_MAINNET, CHAIN_TAG_TESTNET);
        assert_ne!(CHAIN_TAG_MAINNET, CHAIN_TAG_DEVNET);
        assert_ne!(CHAIN_TAG_TESTNET, CHAIN_TAG_DEVNET);
    }

    #[test]
    fn test_clause_gas_values() {
        assert_eq!(CLAUSE_GAS, 16_000);
        assert_eq!(CLAUSE_GAS_CONTRACT_CREATION, 48_000);
        assert!(CLAUSE_GAS < CLAUSE_GAS_CONTRACT_CREATION);
    }

    #[test]
    fn test_work_decay_is_a_decay() {
        assert!(WORK_DECAY_NUMERATOR < WORK_DECAY_DENOMINATOR);
    }

    #[test]
    fn test_network_name_formatting() {
        assert_eq!(network_name(CHAIN_TAG_MAINNET), "mainnet");
        assert_eq!(network_name(0x01), "unknown(0x01)");
    }

    #[test]
    fn test_default_signer_cache_config() {
        assert_eq!(SignerCacheConfig::default().capacity, 1_024);
    }
}
