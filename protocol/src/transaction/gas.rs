//! Gas accounting and fee pricing.
//!
//! Three consensus rules live here:
//!
//! 1. **Intrinsic gas**: what a tx costs before a single opcode runs. A flat
//!    per-tx charge plus, per clause, a call or creation charge and a charge
//!    per byte of data. Overflow is an out-of-gas rejection, never a wrap.
//! 2. **Gas price**: `base + base * coef / 255`.
//! 3. **Overall gas price**: the gas price plus a bonus bought with proved
//!    work, available only to txs that reference a recent block on the
//!    canonical chain. The bonus is capped by the declared gas, so it never
//!    exceeds `base`.
//!
//! All arithmetic is exact: intermediate products that could overflow 256
//! bits are rearranged, and the monthly work decay runs on a wide integer.

use alloy_primitives::{Uint, B256, U256};

use super::builder::Transaction;
use super::error::TxError;
use super::types::Clause;
use crate::config::{
    BLOCK_INTERVAL, CLAUSE_GAS, CLAUSE_GAS_CONTRACT_CREATION, MAX_TX_WORK_DELAY,
    SECONDS_PER_MONTH, TX_DATA_NON_ZERO_GAS, TX_DATA_ZERO_GAS, TX_GAS, WORK_DECAY_DENOMINATOR,
    WORK_DECAY_NUMERATOR, WORK_PER_GAS,
};

// ---------------------------------------------------------------------------
// Chain-head interface
// ---------------------------------------------------------------------------

/// Read access to the canonical chain: the id of the block at a height.
///
/// Any `Fn(u32) -> B256` qualifies, so a closure over a block store works.
pub trait BlockIdLookup {
    /// Id of the canonical block numbered `number`.
    fn block_id_at(&self, number: u32) -> B256;
}

impl<F> BlockIdLookup for F
where
    F: Fn(u32) -> B256,
{
    fn block_id_at(&self, number: u32) -> B256 {
        self(number)
    }
}

// ---------------------------------------------------------------------------
// Intrinsic gas
// ---------------------------------------------------------------------------

/// Gas charged for a clause's data bytes.
pub fn data_gas(data: &[u8]) -> Result<u64, TxError> {
    let zeros = data.iter().filter(|b| **b == 0).count() as u64;
    let non_zeros = data.len() as u64 - zeros;
    data_gas_for(zeros, non_zeros)
}

fn data_gas_for(zeros: u64, non_zeros: u64) -> Result<u64, TxError> {
    let z = TX_DATA_ZERO_GAS.checked_mul(zeros).ok_or(TxError::OutOfGas)?;
    let nz = TX_DATA_NON_ZERO_GAS
        .checked_mul(non_zeros)
        .ok_or(TxError::OutOfGas)?;
    z.checked_add(nz).ok_or(TxError::OutOfGas)
}

/// Intrinsic gas of a clause list.
///
/// An empty list costs as much as a single plain call, so a clause-less tx
/// isn't cheaper than the cheapest useful one.
pub fn intrinsic_gas(clauses: &[Clause]) -> Result<u64, TxError> {
    if clauses.is_empty() {
        return Ok(TX_GAS + CLAUSE_GAS);
    }

    clauses.iter().try_fold(TX_GAS, |total, clause| {
        let clause_gas = if clause.is_contract_creation() {
            CLAUSE_GAS_CONTRACT_CREATION
        } else {
            CLAUSE_GAS
        };
        total
            .checked_add(data_gas(clause.data())?)
            .and_then(|t| t.checked_add(clause_gas))
            .ok_or(TxError::OutOfGas)
    })
}

// ---------------------------------------------------------------------------
// Work
// ---------------------------------------------------------------------------

const fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

const DECAY_GCD: u64 = gcd(WORK_DECAY_NUMERATOR, WORK_DECAY_DENOMINATOR);

/// The decay ratio in lowest terms: 25/26.
const DECAY_NUM: u64 = WORK_DECAY_NUMERATOR / DECAY_GCD;
const DECAY_DEN: u64 = WORK_DECAY_DENOMINATOR / DECAY_GCD;

/// Wide enough for `26^4400` and `(U256::MAX / WORK_PER_GAS) * 25^4400`.
type Wide = Uint<20_800, 325>;

/// Past this many months, `2^256 * (25/26)^months < 1`: all work has decayed
/// to zero gas.
const MAX_DECAY_MONTHS: u64 = 4_400;

/// Converts proved work into gas, as of block `block_num`.
///
/// One gas costs [`WORK_PER_GAS`] units of work, decaying by a factor
/// `100/104` for every full month of chain time. Saturates at `u64::MAX`.
pub fn work_to_gas(work: U256, block_num: u32) -> u64 {
    let gas = work / U256::from(WORK_PER_GAS);
    let months = u64::from(block_num) * BLOCK_INTERVAL / SECONDS_PER_MONTH;
    if months == 0 {
        return u64::try_from(gas).unwrap_or(u64::MAX);
    }
    if months > MAX_DECAY_MONTHS {
        return 0;
    }

    let exp = Wide::from(months);
    let numerator = Wide::from(gas) * Wide::from(DECAY_NUM).pow(exp);
    let denominator = Wide::from(DECAY_DEN).pow(exp);
    u64::try_from(numerator / denominator).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// `floor(a * b / d)` for `b <= d`, without overflowing 256 bits.
fn mul_div_small(a: U256, b: U256, d: U256) -> U256 {
    let (q, r) = a.div_rem(d);
    q * b + r * b / d
}

impl Transaction {
    /// Gas this tx costs before execution.
    pub fn intrinsic_gas(&self) -> Result<u64, TxError> {
        intrinsic_gas(&self.body.clauses)
    }

    /// `base + base * gas_price_coef / 255`, rounded down. Saturates at
    /// `U256::MAX`.
    pub fn gas_price(&self, base_gas_price: U256) -> U256 {
        let coef = U256::from(self.body.gas_price_coef);
        let bonus = mul_div_small(base_gas_price, coef, U256::from(u8::MAX));
        base_gas_price.saturating_add(bonus)
    }

    /// Gas price including the proved-work bonus.
    ///
    /// The bonus is `min(work_to_gas(proved_work, head), gas) * base / gas`,
    /// and is granted only when [`measure_delay`](Self::measure_delay) finds
    /// the block reference on the canonical chain within
    /// [`MAX_TX_WORK_DELAY`] blocks of `head_block_num`. Unsigned txs prove no
    /// work; a tx declaring zero gas gets no bonus.
    pub fn overall_gas_price<L>(&self, base_gas_price: U256, head_block_num: u32, lookup: &L) -> U256
    where
        L: BlockIdLookup + ?Sized,
    {
        let gas_price = self.gas_price(base_gas_price);
        if self.body.gas == 0 {
            return gas_price;
        }
        match self.measure_delay(head_block_num, lookup) {
            Some(delay) if delay <= MAX_TX_WORK_DELAY => {}
            _ => return gas_price,
        }

        let work_gas = work_to_gas(self.proved_work(), head_block_num).min(self.body.gas);
        let bonus = mul_div_small(
            base_gas_price,
            U256::from(work_gas),
            U256::from(self.body.gas),
        );
        gas_price.saturating_add(bonus)
    }

    /// Blocks elapsed between the referenced block and `head_block_num`.
    ///
    /// `None` means "infinitely delayed": the reference is not strictly
    /// behind the head, is more than [`MAX_TX_WORK_DELAY`] blocks behind,
    /// or doesn't match the canonical block id at its height.
    pub fn measure_delay<L>(&self, head_block_num: u32, lookup: &L) -> Option<u32>
    where
        L: BlockIdLookup + ?Sized,
    {
        let block_ref = self.block_ref();
        let ref_num = block_ref.number();
        if ref_num >= head_block_num {
            return None;
        }
        let delay = head_block_num - ref_num;
        if delay > MAX_TX_WORK_DELAY {
            return None;
        }
        block_ref
            .matches(&lookup.block_id_at(ref_num))
            .then_some(delay)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
