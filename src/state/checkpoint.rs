//! In-memory checkpointed scan state.
//!
//! Events are keyed `block -> tx hash -> log index`; log index is the only
//! ordering signal that matters downstream, so BTreeMaps keep both the
//! serialized form and every iteration deterministic.

use std::collections::{btree_map::Entry, BTreeMap};

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Records of one transaction, by log index.
pub type TxEvents = BTreeMap<u64, EventRecord>;
/// Transactions of one block, by transaction hash.
pub type BlockEvents = BTreeMap<String, TxEvents>;
/// The full event mapping, by block number.
pub type EventMap = BTreeMap<u64, BlockEvents>;

/// A decoded pair event. Raw amounts stay `U256`; they exceed 64 bits for
/// many tokens and are serialized as decimal strings so the state file
/// round-trips them without precision loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    Sync {
        #[serde(with = "u256_string")]
        reserve0: U256,
        #[serde(with = "u256_string")]
        reserve1: U256,
    },
    Swap {
        sender: String,
        to: String,
        #[serde(with = "u256_string")]
        amount0_in: U256,
        #[serde(with = "u256_string")]
        amount1_in: U256,
        #[serde(with = "u256_string")]
        amount0_out: U256,
        #[serde(with = "u256_string")]
        amount1_out: U256,
    },
}

/// One event with its position in the chain. Immutable once merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub block_number: u64,
    pub tx_hash: String,
    pub log_index: u64,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Outcome of [`CheckpointedState::merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    /// The identical record was already present (safety-margin re-scan).
    Duplicate,
}

/// The resumable scan state: the accumulated event mapping plus the last
/// block whose full log set has been durably recorded.
///
/// `last_scanned_block` is `None` until the first commit; that stands in
/// for the "first block minus one" starting point without underflowing
/// when scanning from block 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointedState {
    pub events: EventMap,
    pub last_scanned_block: Option<u64>,
}

impl CheckpointedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent upsert. Re-merging an identical record is a no-op; a
    /// *different* record at an occupied position means the node served a
    /// log that disagrees with what was recorded earlier — a reorg deeper
    /// than the safety margin or an inconsistent node. That must stop the
    /// scan rather than silently overwrite history.
    pub fn merge(&mut self, record: EventRecord) -> Result<MergeOutcome, ScanError> {
        let slot = self
            .events
            .entry(record.block_number)
            .or_default()
            .entry(record.tx_hash.clone())
            .or_default();

        match slot.entry(record.log_index) {
            Entry::Vacant(entry) => {
                entry.insert(record);
                Ok(MergeOutcome::Inserted)
            },
            Entry::Occupied(entry) => {
                if entry.get() == &record {
                    Ok(MergeOutcome::Duplicate)
                } else {
                    Err(ScanError::InvariantViolation {
                        block_number: record.block_number,
                        tx_hash: record.tx_hash,
                        log_index: record.log_index,
                        reason: "freshly fetched log disagrees with previously recorded log"
                            .to_string(),
                    })
                }
            },
        }
    }

    /// Advance the checkpoint. Monotone: safety-margin re-scans commit
    /// chunks that end below the old checkpoint, and those must never move
    /// it backwards.
    pub(crate) fn advance(&mut self, upto_block: u64) {
        self.last_scanned_block = Some(match self.last_scanned_block {
            Some(last) => last.max(upto_block),
            None => upto_block,
        });
    }

    /// Total number of recorded events across all blocks.
    pub fn event_count(&self) -> usize {
        self.events
            .values()
            .flat_map(|txs| txs.values())
            .map(|logs| logs.len())
            .sum()
    }
}

pub(crate) mod u256_string {
    use std::str::FromStr;

    use alloy::primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        U256::from_str(&raw).map_err(serde::de::Error::custom)
    }
}
