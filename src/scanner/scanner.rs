//! Resumable chunked log scanner.
//!
//! Walks `[cursor, end]` in adaptively sized chunks against the node
//! client. Each chunk is fetched, fully decoded and merged, and only then
//! committed — a crash or cancellation never leaves a partial chunk in the
//! durable state.

use std::{sync::Arc, time::Duration};

use backon::Retryable;
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::{
    config::ScanSettings,
    error::{NodeError, ScanError},
    node::{backoff_policy, BlockHeader, NodeClient, RawLog},
    state::{CheckpointedState, JsonStateFile},
};

use super::decode::decode_log;

/// Upper bound of a scan invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEnd {
    /// Resolve the chain tip once at scan start. A tip that moves mid-scan
    /// is deliberately not re-queried, keeping execution time bounded; the
    /// next invocation picks up the difference.
    Latest,
    Block(u64),
}

pub struct RangeScanner<C> {
    client: Arc<C>,
    store: JsonStateFile,
    first_block: u64,
    safety_margin: u64,
    min_chunk: u64,
    max_chunk: u64,
    start_chunk: u64,
    growth_threshold: usize,
    max_retries: usize,
    retry_min_delay: Duration,
}

impl<C: NodeClient> RangeScanner<C> {
    pub fn new(
        client: Arc<C>,
        store: JsonStateFile,
        scan: &ScanSettings,
        max_retries: usize,
        retry_min_delay: Duration,
    ) -> Self {
        Self {
            client,
            store,
            first_block: scan.first_block,
            safety_margin: scan.safety_margin,
            min_chunk: scan.min_chunk.max(1),
            max_chunk: scan.max_chunk.max(scan.min_chunk.max(1)),
            start_chunk: scan.start_chunk,
            growth_threshold: scan.chunk_growth_threshold,
            max_retries,
            retry_min_delay,
        }
    }

    /// Scan up to `end`, committing after every chunk, and return the
    /// final state. Safe to call again with a later end block to extend
    /// coverage; the safety margin makes the overlap re-merge idempotent.
    pub async fn scan(
        &self,
        end: ScanEnd,
        cancel: &CancellationToken,
    ) -> Result<CheckpointedState, ScanError> {
        let mut state = self.store.restore()?;

        let end_block = match end {
            ScanEnd::Block(number) => number,
            ScanEnd::Latest => self.fetch_latest().await?.number,
        };

        let mut cursor = resume_cursor(
            self.first_block,
            state.last_scanned_block,
            self.safety_margin,
        );
        let mut chunk = self.start_chunk.clamp(self.min_chunk, self.max_chunk);

        if cursor > end_block {
            info!("nothing to scan: cursor {cursor} is past end block {end_block}");
            return Ok(state);
        }
        info!("scanning blocks {cursor}..={end_block} starting with chunk size {chunk}");

        while cursor <= end_block {
            if cancel.is_cancelled() {
                info!("scan cancelled before block {cursor}; durable state is consistent at the last commit");
                break;
            }

            let to = end_block.min(cursor + (chunk - 1));
            match self.fetch_logs(cursor, to).await {
                Ok(logs) => {
                    let fetched = logs.len();
                    for log in &logs {
                        if let Some(record) = decode_log(log) {
                            state.merge(record)?;
                        }
                    }
                    // Commit only after the whole chunk is merged.
                    self.store.commit(&mut state, to)?;
                    info!(
                        "committed blocks {cursor}..={to} ({fetched} logs, {} events total)",
                        state.event_count()
                    );

                    if fetched < self.growth_threshold {
                        chunk = chunk.saturating_mul(2).min(self.max_chunk);
                    }
                    cursor = to + 1;
                },
                Err(NodeError::RangeTooLarge { ref message, .. }) if chunk > self.min_chunk => {
                    chunk = (chunk / 2).max(self.min_chunk);
                    warn!("range {cursor}..={to} too large ({message}); retrying with chunk size {chunk}");
                },
                Err(err @ NodeError::RangeTooLarge { .. }) => {
                    return Err(ScanError::Fatal {
                        from: cursor,
                        to,
                        source: err,
                    });
                },
                // Retries already exhausted inside fetch_logs; everything
                // committed so far stays on disk.
                Err(err) => return Err(err.into()),
            }
        }

        Ok(state)
    }

    async fn fetch_latest(&self) -> Result<BlockHeader, NodeError> {
        (|| self.client.latest_block())
            .retry(backoff_policy(self.max_retries, self.retry_min_delay))
            .when(NodeError::is_retryable)
            .notify(|err: &NodeError, dur: Duration| {
                warn!("latest block fetch failed ({err}); retrying in {dur:?}");
            })
            .await
    }

    async fn fetch_logs(&self, from: u64, to: u64) -> Result<Vec<RawLog>, NodeError> {
        (|| self.client.logs(from, to))
            .retry(backoff_policy(self.max_retries, self.retry_min_delay))
            .when(NodeError::is_retryable)
            .notify(move |err: &NodeError, dur: Duration| {
                warn!("log fetch {from}..={to} failed ({err}); retrying in {dur:?}");
            })
            .await
    }
}

/// Where a scan resumes: the last `safety_margin` blocks of the previous
/// run are always re-fetched to absorb short reorganizations, but never
/// below the configured first block.
fn resume_cursor(first_block: u64, last_scanned: Option<u64>, safety_margin: u64) -> u64 {
    match last_scanned {
        None => first_block,
        Some(last) => (last + 1).saturating_sub(safety_margin).max(first_block),
    }
}

#[cfg(test)]
mod tests {
    use super::resume_cursor;

    #[test]
    fn fresh_state_starts_at_first_block() {
        assert_eq!(resume_cursor(11_876_000, None, 30), 11_876_000);
    }

    #[test]
    fn resume_rewinds_by_the_safety_margin() {
        assert_eq!(resume_cursor(100, Some(1_000), 30), 971);
    }

    #[test]
    fn resume_never_goes_below_first_block() {
        assert_eq!(resume_cursor(990, Some(1_000), 30), 990);
        assert_eq!(resume_cursor(0, Some(10), 30), 0);
    }
}
