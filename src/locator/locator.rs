//! Date-to-block resolution by binary search over block timestamps.
//!
//! Relies on block timestamps being non-decreasing with block number; deep
//! reorgs that violate that are out of scope.

use std::{sync::Arc, sync::Mutex, time::Duration};

use backon::Retryable;
use chrono::{NaiveDate, NaiveTime};
use log::{info, warn};
use rustc_hash::FxHashMap;

use crate::{
    error::{NodeError, ScanError},
    node::{backoff_policy, NodeClient},
};

use super::date_cache::DateCache;

pub struct BlockLocator<C> {
    client: Arc<C>,
    max_retries: usize,
    retry_min_delay: Duration,
    /// Per-block timestamp memo. Append-only, so sharing it read-mostly
    /// across calls within the process is safe.
    memo: Mutex<FxHashMap<u64, u64>>,
}

impl<C: NodeClient> BlockLocator<C> {
    pub fn new(client: Arc<C>, max_retries: usize, retry_min_delay: Duration) -> Self {
        Self {
            client,
            max_retries,
            retry_min_delay,
            memo: Mutex::new(FxHashMap::default()),
        }
    }

    /// Resolve a calendar date (UTC midnight) to a block number, cache
    /// first. On a miss, the cache is updated and persisted.
    pub async fn locate_date(
        &self,
        date: NaiveDate,
        cache: &mut DateCache,
    ) -> Result<u64, ScanError> {
        let key = date.format("%Y-%m-%d").to_string();
        if let Some(block) = cache.get(&key) {
            info!("block for {key} (cached): {block}");
            return Ok(block);
        }

        let target = date.and_time(NaiveTime::MIN).and_utc().timestamp();
        let block = self.locate(target.max(0) as u64).await?;
        cache.insert(&key, block);
        cache.commit()?;
        info!("closest block to {key}: {block}");
        Ok(block)
    }

    /// Find the block whose timestamp is closest to `target_ts`.
    ///
    /// Exact matches return that block; otherwise whichever boundary
    /// candidate at search termination is closer wins, ties going to the
    /// lower block number. O(log latest) block fetches, each retried with
    /// the same backoff policy as the scanner.
    pub async fn locate(&self, target_ts: u64) -> Result<u64, NodeError> {
        let latest = (|| self.client.latest_block())
            .retry(backoff_policy(self.max_retries, self.retry_min_delay))
            .when(NodeError::is_retryable)
            .notify(|err: &NodeError, dur: Duration| {
                warn!("latest block fetch failed ({err}); retrying in {dur:?}");
            })
            .await?;

        let mut low: i64 = 0;
        let mut high: i64 = latest.number as i64;

        while low <= high {
            let mid = (low + high) / 2;
            let ts = self.timestamp_at(mid as u64).await?;
            match ts.cmp(&target_ts) {
                std::cmp::Ordering::Less => low = mid + 1,
                std::cmp::Ordering::Greater => high = mid - 1,
                std::cmp::Ordering::Equal => return Ok(mid as u64),
            }
        }

        // No exact hit: `high` is now the lower candidate, `low` the upper
        // (clamped for targets outside the chain's timestamp range).
        let upper = (low.max(0) as u64).min(latest.number);
        let lower = (high.max(0) as u64).min(latest.number);
        let upper_diff = self.timestamp_at(upper).await?.abs_diff(target_ts);
        let lower_diff = self.timestamp_at(lower).await?.abs_diff(target_ts);

        if upper_diff < lower_diff {
            Ok(upper)
        } else {
            Ok(lower)
        }
    }

    async fn timestamp_at(&self, number: u64) -> Result<u64, NodeError> {
        if let Some(ts) = self.memo.lock().unwrap().get(&number) {
            return Ok(*ts);
        }

        let header = (|| self.client.block_by_number(number))
            .retry(backoff_policy(self.max_retries, self.retry_min_delay))
            .when(NodeError::is_retryable)
            .notify(move |err: &NodeError, dur: Duration| {
                warn!("block {number} fetch failed ({err}); retrying in {dur:?}");
            })
            .await?;

        self.memo.lock().unwrap().insert(number, header.timestamp);
        Ok(header.timestamp)
    }
}
