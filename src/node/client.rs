use alloy::primitives::{Bytes, B256};
use async_trait::async_trait;

use crate::error::NodeError;

/// Header fields the pipeline needs from a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub number: u64,
    pub timestamp: u64,
}

/// One undecoded log entry as returned by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLog {
    pub block_number: u64,
    pub tx_hash: String,
    pub log_index: u64,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// The node collaborator: everything the scanner and locator need from an
/// EVM endpoint. The contract address and topic filter are fixed at client
/// construction, so `logs` only takes the block range.
///
/// Implementations must signal `RangeTooLarge`, `RateLimited` and
/// `Transient` distinctly; the scanner reacts differently to each.
#[async_trait]
pub trait NodeClient: Send + Sync {
    async fn latest_block(&self) -> Result<BlockHeader, NodeError>;

    async fn block_by_number(&self, number: u64) -> Result<BlockHeader, NodeError>;

    /// Fetch logs for `[from_block, to_block]` (inclusive), filtered to the
    /// configured address and topics.
    async fn logs(&self, from_block: u64, to_block: u64) -> Result<Vec<RawLog>, NodeError>;
}
