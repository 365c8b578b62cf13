//! Error types for the scanning pipeline.

use thiserror::Error;

/// Errors signaled by the node client.
///
/// The distinction matters to the scanner: `RangeTooLarge` triggers chunk
/// halving, `RateLimited` and `Transient` go through exponential backoff,
/// and anything surviving both is surfaced to the caller.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("log range {from}..={to} rejected as too large: {message}")]
    RangeTooLarge {
        from: u64,
        to: u64,
        message: String,
    },

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("transient node failure: {0}")]
    Transient(String),
}

impl NodeError {
    /// Returns `true` if the error should be retried with backoff.
    ///
    /// `RangeTooLarge` is deliberately not retryable here: retrying the
    /// same range would fail identically, so it is handled by shrinking
    /// the chunk instead.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Transient(_))
    }
}

/// Errors that can occur while scanning or restoring checkpointed state.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("corrupt state file {path}: {reason}")]
    CorruptState { path: String, reason: String },

    #[error(
        "invariant violation at block {block_number} tx {tx_hash} log {log_index}: {reason}"
    )]
    InvariantViolation {
        block_number: u64,
        tx_hash: String,
        log_index: u64,
        reason: String,
    },

    /// The node rejected the minimum chunk size; no smaller range can be
    /// attempted. Everything committed before this point is preserved.
    #[error("scan aborted in range {from}..={to} at minimum chunk size: {source}")]
    Fatal {
        from: u64,
        to: u64,
        source: NodeError,
    },

    /// A transient failure that survived the full retry budget.
    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("state io: {0}")]
    Io(#[from] std::io::Error),
}
