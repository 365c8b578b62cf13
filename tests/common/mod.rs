#![allow(dead_code)]

use std::{
    collections::VecDeque,
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use alloy::{
    primitives::{aliases::U112, Address, LogData, U256},
    sol_types::SolEvent,
};
use async_trait::async_trait;
use pairscan::{
    abis,
    config::ScanSettings,
    error::NodeError,
    node::{BlockHeader, NodeClient, RawLog},
};

/// Scripted in-memory node. Timestamps follow `genesis_ts + n * spacing`,
/// logs come from a fixed set filtered by the requested range, and per-call
/// outcomes can be scripted to inject failures.
pub struct MockNode {
    latest: u64,
    genesis_ts: u64,
    block_spacing: u64,
    max_range: Option<u64>,
    logs: Vec<RawLog>,
    script: Mutex<VecDeque<Option<NodeError>>>,
    log_requests: Mutex<Vec<(u64, u64)>>,
    header_fetches: AtomicUsize,
}

impl MockNode {
    pub fn new(latest: u64) -> Self {
        Self {
            latest,
            genesis_ts: 1_600_000_000,
            block_spacing: 15,
            max_range: None,
            logs: Vec::new(),
            script: Mutex::new(VecDeque::new()),
            log_requests: Mutex::new(Vec::new()),
            header_fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_spacing(mut self, genesis_ts: u64, block_spacing: u64) -> Self {
        self.genesis_ts = genesis_ts;
        self.block_spacing = block_spacing;
        self
    }

    pub fn with_logs(mut self, logs: Vec<RawLog>) -> Self {
        self.logs = logs;
        self
    }

    /// Every `logs` request wider than `max_range` blocks fails with
    /// `RangeTooLarge`, mimicking a provider result cap.
    pub fn with_max_range(mut self, max_range: u64) -> Self {
        self.max_range = Some(max_range);
        self
    }

    /// Script the outcome of the next unscripted `logs` call: `Some(err)`
    /// fails it, `None` lets it through. Once the script runs out, calls
    /// proceed normally.
    pub fn script_next(&self, outcome: Option<NodeError>) {
        self.script.lock().unwrap().push_back(outcome);
    }

    pub fn timestamp(&self, number: u64) -> u64 {
        self.genesis_ts + number * self.block_spacing
    }

    /// Every `(from, to)` range requested so far, including failed calls.
    pub fn log_requests(&self) -> Vec<(u64, u64)> {
        self.log_requests.lock().unwrap().clone()
    }

    pub fn header_fetches(&self) -> usize {
        self.header_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeClient for MockNode {
    async fn latest_block(&self) -> Result<BlockHeader, NodeError> {
        Ok(BlockHeader {
            number: self.latest,
            timestamp: self.timestamp(self.latest),
        })
    }

    async fn block_by_number(&self, number: u64) -> Result<BlockHeader, NodeError> {
        self.header_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(BlockHeader {
            number,
            timestamp: self.timestamp(number),
        })
    }

    async fn logs(&self, from_block: u64, to_block: u64) -> Result<Vec<RawLog>, NodeError> {
        self.log_requests.lock().unwrap().push((from_block, to_block));

        if let Some(err) = self.script.lock().unwrap().pop_front().flatten() {
            return Err(err);
        }
        if let Some(max) = self.max_range {
            if to_block - from_block + 1 > max {
                return Err(NodeError::RangeTooLarge {
                    from: from_block,
                    to: to_block,
                    message: "query returned more than 10000 results".to_string(),
                });
            }
        }

        Ok(self
            .logs
            .iter()
            .filter(|log| (from_block..=to_block).contains(&log.block_number))
            .cloned()
            .collect())
    }
}

pub fn sync_log(block: u64, tx: &str, log_index: u64, reserve0: u64, reserve1: u64) -> RawLog {
    let event = abis::Sync {
        reserve0: U112::from(reserve0),
        reserve1: U112::from(reserve1),
    };
    raw_log(block, tx, log_index, event.encode_log_data())
}

pub fn swap_log(block: u64, tx: &str, log_index: u64, amount0_in: u64, amount1_out: u64) -> RawLog {
    let event = abis::Swap {
        sender: Address::repeat_byte(0x11),
        to: Address::repeat_byte(0x22),
        amount0In: U256::from(amount0_in),
        amount1In: U256::ZERO,
        amount0Out: U256::ZERO,
        amount1Out: U256::from(amount1_out),
    };
    raw_log(block, tx, log_index, event.encode_log_data())
}

fn raw_log(block: u64, tx: &str, log_index: u64, data: LogData) -> RawLog {
    RawLog {
        block_number: block,
        tx_hash: tx.to_string(),
        log_index,
        topics: data.topics().to_vec(),
        data: data.data.clone(),
    }
}

pub fn scan_settings(state_file: &Path) -> ScanSettings {
    ScanSettings {
        contract_address: "0x85cb0bab616fe88a89a35080516a8928f38b518b".to_string(),
        first_block: 0,
        last_block: None,
        state_file: state_file.display().to_string(),
        safety_margin: 30,
        min_chunk: 16,
        max_chunk: 10_000,
        start_chunk: 1_000,
        chunk_growth_threshold: 2_000,
    }
}
