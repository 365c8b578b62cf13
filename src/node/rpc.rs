//! JSON-RPC node client backed by an alloy HTTP provider.
//!
//! Maps transport and JSON-RPC errors onto the [`NodeError`] taxonomy so
//! the scanner can tell "shrink the chunk" apart from "back off and retry".

use std::time::Duration;

use alloy::{
    eips::BlockNumberOrTag,
    primitives::{Address, B256},
    providers::{Provider, RootProvider},
    rpc::types::Filter,
    transports::{RpcError, TransportErrorKind},
};
use anyhow::Context;
use async_trait::async_trait;
use tokio::time::timeout;
use url::Url;

use crate::error::NodeError;

use super::client::{BlockHeader, NodeClient, RawLog};

pub struct RpcNodeClient {
    provider: RootProvider,
    address: Address,
    topics: Vec<B256>,
    call_timeout: Duration,
}

impl RpcNodeClient {
    pub fn new(
        url: &str,
        contract_address: &str,
        topics: Vec<B256>,
        call_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let url: Url = url.parse().context("Invalid node URL")?;
        let address: Address = contract_address
            .parse()
            .context("Invalid contract address")?;

        Ok(Self {
            provider: RootProvider::new_http(url),
            address,
            topics,
            call_timeout,
        })
    }

    async fn header(&self, tag: BlockNumberOrTag) -> Result<BlockHeader, NodeError> {
        let block = timeout(self.call_timeout, self.provider.get_block_by_number(tag))
            .await
            .map_err(|_| timed_out("eth_getBlockByNumber", self.call_timeout))?
            .map_err(classify)?
            .ok_or_else(|| NodeError::Transient(format!("block {tag} not available")))?;

        Ok(BlockHeader {
            number: block.header.number,
            timestamp: block.header.timestamp,
        })
    }
}

#[async_trait]
impl NodeClient for RpcNodeClient {
    async fn latest_block(&self) -> Result<BlockHeader, NodeError> {
        self.header(BlockNumberOrTag::Latest).await
    }

    async fn block_by_number(&self, number: u64) -> Result<BlockHeader, NodeError> {
        self.header(BlockNumberOrTag::Number(number)).await
    }

    async fn logs(&self, from_block: u64, to_block: u64) -> Result<Vec<RawLog>, NodeError> {
        let filter = Filter::new()
            .address(self.address)
            .event_signature(self.topics.clone())
            .from_block(from_block)
            .to_block(to_block);

        let logs = timeout(self.call_timeout, self.provider.get_logs(&filter))
            .await
            .map_err(|_| timed_out("eth_getLogs", self.call_timeout))?
            .map_err(|e| classify_range(from_block, to_block, e))?;

        // Pending logs carry no position; they can never enter the
        // checkpoint, so they are dropped here.
        Ok(logs
            .into_iter()
            .filter_map(|log| {
                let block_number = log.block_number?;
                let tx_hash = format!("{:#x}", log.transaction_hash?);
                let log_index = log.log_index?;
                Some(RawLog {
                    block_number,
                    tx_hash,
                    log_index,
                    topics: log.inner.topics().to_vec(),
                    data: log.inner.data.data.clone(),
                })
            })
            .collect())
    }
}

fn timed_out(method: &str, after: Duration) -> NodeError {
    NodeError::Transient(format!("{method} timed out after {after:?}"))
}

/// Classify an RPC failure from a call that has no range semantics.
fn classify(err: RpcError<TransportErrorKind>) -> NodeError {
    match &err {
        RpcError::ErrorResp(payload) if is_rate_limit(payload.code, &payload.message) => {
            NodeError::RateLimited(payload.message.to_string())
        },
        _ => NodeError::Transient(err.to_string()),
    }
}

/// Classify an `eth_getLogs` failure, additionally recognizing the
/// provider-specific "range too large" rejections.
fn classify_range(from: u64, to: u64, err: RpcError<TransportErrorKind>) -> NodeError {
    if let RpcError::ErrorResp(payload) = &err {
        if is_rate_limit(payload.code, &payload.message) {
            return NodeError::RateLimited(payload.message.to_string());
        }
        if is_range_too_large(payload.code, &payload.message) {
            return NodeError::RangeTooLarge {
                from,
                to,
                message: payload.message.to_string(),
            };
        }
    }
    NodeError::Transient(err.to_string())
}

fn is_rate_limit(code: i64, message: &str) -> bool {
    let msg = message.to_lowercase();
    code == 429
        || msg.contains("rate limit")
        || msg.contains("too many requests")
        || (msg.contains("rate") && msg.contains("exceeded"))
}

/// Providers phrase the rejection differently:
/// Infura uses -32005 "query returned more than 10000 results", Alchemy
/// -32602 "Log response size exceeded", geth -32000 with a block-range hint.
fn is_range_too_large(code: i64, message: &str) -> bool {
    let msg = message.to_lowercase();
    matches!(code, -32005 | -32602 | -32000)
        && (msg.contains("more than")
            || msg.contains("too large")
            || msg.contains("block range")
            || msg.contains("response size")
            || msg.contains("query timeout"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infura_result_cap_is_range_too_large() {
        assert!(is_range_too_large(
            -32005,
            "query returned more than 10000 results"
        ));
    }

    #[test]
    fn alchemy_response_size_is_range_too_large() {
        assert!(is_range_too_large(
            -32602,
            "Log response size exceeded. You can make eth_getLogs requests with up to a 2K block range"
        ));
    }

    #[test]
    fn rate_limit_messages_are_not_range_errors() {
        assert!(is_rate_limit(-32005, "project ID request rate exceeded"));
        assert!(!is_range_too_large(-32005, "project ID request rate exceeded"));
        assert!(is_rate_limit(429, "Too Many Requests"));
    }

    #[test]
    fn generic_errors_classify_as_transient() {
        let err = RpcError::<TransportErrorKind>::local_usage_str("connection reset");
        assert!(matches!(classify(err), NodeError::Transient(_)));
    }
}
