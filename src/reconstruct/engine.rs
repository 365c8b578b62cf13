//! Swap reconstruction: from the checkpointed event mapping to a flat,
//! ordered table of per-swap facts.
//!
//! Within a transaction the log index is the only ordering signal, and it
//! is load-bearing: the `Sync` reserve snapshot logically precedes the
//! `Swap` record(s) it is paired with.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::{
    config::PairSettings,
    state::{EventKind, EventMap, EventRecord, TxEvents},
};

use super::units::{price_ratio, to_standard_units, u256_to_bigint};

/// Decimal counts of the two pool tokens.
#[derive(Debug, Clone, Copy)]
pub struct TokenPair {
    pub token0_decimals: u8,
    pub token1_decimals: u8,
}

impl From<&PairSettings> for TokenPair {
    fn from(pair: &PairSettings) -> Self {
        Self {
            token0_decimals: pair.token0.decimals,
            token1_decimals: pair.token1.decimals,
        }
    }
}

/// One reconstructed swap. Raw reserves are signed so that corrupt input
/// (an out amount exceeding the snapshot) stays visible instead of being
/// clamped away.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapFact {
    pub block_number: u64,
    pub tx_hash: String,
    pub log_index: u64,
    pub sender: String,
    pub to: String,
    pub reserve0_pre: Option<BigInt>,
    pub reserve1_pre: Option<BigInt>,
    pub reserve0_post: Option<BigInt>,
    pub reserve1_post: Option<BigInt>,
    pub reserve0_pre_units: Option<BigDecimal>,
    pub reserve1_pre_units: Option<BigDecimal>,
    pub reserve0_post_units: Option<BigDecimal>,
    pub reserve1_post_units: Option<BigDecimal>,
    pub amount0_in: BigDecimal,
    pub amount1_in: BigDecimal,
    pub amount0_out: BigDecimal,
    pub amount1_out: BigDecimal,
    /// token0 priced in token1, from post-swap human-scaled reserves.
    pub pair0_cost: Option<BigDecimal>,
    /// token1 priced in token0.
    pub pair1_cost: Option<BigDecimal>,
    /// Set when the swap had no preceding `Sync` in its transaction; the
    /// reserve and price columns are empty but the row is kept.
    pub incomplete_context: bool,
}

/// Reconstruct swap facts from the full event mapping.
///
/// Blocks ascend; within a block, transactions are ordered by their first
/// log index (their position in the block); within a transaction, records
/// fold in ascending log-index order. `Sync` records alone never emit a
/// row.
pub fn reconstruct(events: &EventMap, pair: &TokenPair) -> Vec<SwapFact> {
    let mut facts = Vec::new();

    for txs in events.values() {
        let mut ordered: Vec<&TxEvents> = txs.values().collect();
        ordered.sort_by_key(|logs| logs.keys().next().copied().unwrap_or(u64::MAX));

        for logs in ordered {
            let mut snapshot: Option<(BigInt, BigInt)> = None;
            for record in logs.values() {
                match &record.kind {
                    EventKind::Sync { reserve0, reserve1 } => {
                        snapshot = Some((u256_to_bigint(reserve0), u256_to_bigint(reserve1)));
                    },
                    EventKind::Swap { .. } => {
                        facts.push(swap_fact(record, pair, snapshot.as_ref()));
                    },
                }
            }
        }
    }

    facts
}

fn swap_fact(
    record: &EventRecord,
    pair: &TokenPair,
    snapshot: Option<&(BigInt, BigInt)>,
) -> SwapFact {
    let EventKind::Swap {
        sender,
        to,
        amount0_in,
        amount1_in,
        amount0_out,
        amount1_out,
    } = &record.kind
    else {
        unreachable!("swap_fact called on a non-swap record");
    };

    let a0_in = u256_to_bigint(amount0_in);
    let a1_in = u256_to_bigint(amount1_in);
    let a0_out = u256_to_bigint(amount0_out);
    let a1_out = u256_to_bigint(amount1_out);

    let mut fact = SwapFact {
        block_number: record.block_number,
        tx_hash: record.tx_hash.clone(),
        log_index: record.log_index,
        sender: sender.clone(),
        to: to.clone(),
        reserve0_pre: None,
        reserve1_pre: None,
        reserve0_post: None,
        reserve1_post: None,
        reserve0_pre_units: None,
        reserve1_pre_units: None,
        reserve0_post_units: None,
        reserve1_post_units: None,
        amount0_in: to_standard_units(&a0_in, pair.token0_decimals),
        amount1_in: to_standard_units(&a1_in, pair.token1_decimals),
        amount0_out: to_standard_units(&a0_out, pair.token0_decimals),
        amount1_out: to_standard_units(&a1_out, pair.token1_decimals),
        pair0_cost: None,
        pair1_cost: None,
        incomplete_context: true,
    };

    let Some((pre0, pre1)) = snapshot else {
        return fact;
    };

    let post0 = pre0 + &a0_in - &a0_out;
    let post1 = pre1 + &a1_in - &a1_out;

    let post0_units = to_standard_units(&post0, pair.token0_decimals);
    let post1_units = to_standard_units(&post1, pair.token1_decimals);

    fact.pair0_cost = price_ratio(&post0_units, &post1_units);
    fact.pair1_cost = price_ratio(&post1_units, &post0_units);
    fact.reserve0_pre_units = Some(to_standard_units(pre0, pair.token0_decimals));
    fact.reserve1_pre_units = Some(to_standard_units(pre1, pair.token1_decimals));
    fact.reserve0_post_units = Some(post0_units);
    fact.reserve1_post_units = Some(post1_units);
    fact.reserve0_pre = Some(pre0.clone());
    fact.reserve1_pre = Some(pre1.clone());
    fact.reserve0_post = Some(post0);
    fact.reserve1_post = Some(post1);
    fact.incomplete_context = false;

    fact
}
