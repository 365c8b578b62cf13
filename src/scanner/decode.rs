//! Raw log decoding by topic0 signature.

use alloy::{
    primitives::{LogData, U256},
    sol_types::SolEvent,
};
use log::warn;

use crate::{
    abis::pair,
    node::RawLog,
    state::{EventKind, EventRecord},
};

/// Decode a raw log into an [`EventRecord`].
///
/// Unknown topics return `None` — the filter can legitimately surface
/// events outside the configured set and those are not errors. A known
/// topic with an undecodable payload is logged and skipped.
pub fn decode_log(log: &RawLog) -> Option<EventRecord> {
    let topic0 = *log.topics.first()?;
    let log_data = LogData::new_unchecked(log.topics.clone(), log.data.clone());

    let kind = match topic0 {
        t if t == pair::Sync::SIGNATURE_HASH => match pair::Sync::decode_log_data(&log_data) {
            Ok(event) => EventKind::Sync {
                reserve0: event.reserve0.to::<U256>(),
                reserve1: event.reserve1.to::<U256>(),
            },
            Err(e) => {
                warn!(
                    "undecodable Sync payload at block {} log {}: {e}",
                    log.block_number, log.log_index
                );
                return None;
            },
        },
        t if t == pair::Swap::SIGNATURE_HASH => match pair::Swap::decode_log_data(&log_data) {
            Ok(event) => EventKind::Swap {
                sender: format!("{:#x}", event.sender),
                to: format!("{:#x}", event.to),
                amount0_in: event.amount0In,
                amount1_in: event.amount1In,
                amount0_out: event.amount0Out,
                amount1_out: event.amount1Out,
            },
            Err(e) => {
                warn!(
                    "undecodable Swap payload at block {} log {}: {e}",
                    log.block_number, log.log_index
                );
                return None;
            },
        },
        _ => return None,
    };

    Some(EventRecord {
        block_number: log.block_number,
        tx_hash: log.tx_hash.clone(),
        log_index: log.log_index,
        kind,
    })
}
