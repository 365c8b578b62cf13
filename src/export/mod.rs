//! CSV export of reconstructed swap facts.
//!
//! This is the externally visible product of reconstruction; column
//! values are the plain decimal renderings of the BigDecimal/BigInt
//! fields, so the file is reproducible byte-for-byte for identical input.

use std::path::Path;

use anyhow::Context;
use log::info;

use crate::reconstruct::SwapFact;

const HEADERS: [&str; 20] = [
    "block_number",
    "tx_hash",
    "log_index",
    "sender",
    "to",
    "reserve0_pre",
    "reserve1_pre",
    "reserve0_post",
    "reserve1_post",
    "reserve0_pre_units",
    "reserve1_pre_units",
    "reserve0_post_units",
    "reserve1_post_units",
    "amount0_in",
    "amount1_in",
    "amount0_out",
    "amount1_out",
    "pair0_cost",
    "pair1_cost",
    "incomplete_context",
];

pub fn write_csv(path: &Path, facts: &[SwapFact]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(HEADERS)?;
    for fact in facts {
        writer.write_record([
            fact.block_number.to_string(),
            fact.tx_hash.clone(),
            fact.log_index.to_string(),
            fact.sender.clone(),
            fact.to.clone(),
            opt(&fact.reserve0_pre),
            opt(&fact.reserve1_pre),
            opt(&fact.reserve0_post),
            opt(&fact.reserve1_post),
            opt(&fact.reserve0_pre_units),
            opt(&fact.reserve1_pre_units),
            opt(&fact.reserve0_post_units),
            opt(&fact.reserve1_post_units),
            fact.amount0_in.to_string(),
            fact.amount1_in.to_string(),
            fact.amount0_out.to_string(),
            fact.amount1_out.to_string(),
            opt(&fact.pair0_cost),
            opt(&fact.pair1_cost),
            fact.incomplete_context.to_string(),
        ])?;
    }
    writer.flush()?;

    info!("wrote {} swap facts to {}", facts.len(), path.display());
    Ok(())
}

/// Empty cell for values a flagged row does not have.
fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}
