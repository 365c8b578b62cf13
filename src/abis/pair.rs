use alloy::{primitives::B256, sol, sol_types::SolEvent};

sol! {
    event Sync(uint112 reserve0, uint112 reserve1);
    event Swap(address indexed sender, uint256 amount0In, uint256 amount1In, uint256 amount0Out, uint256 amount1Out, address indexed to);
}

/// Topic0 set for the configured pair events, in the order they are
/// passed to `eth_getLogs`.
pub fn event_topics() -> Vec<B256> {
    vec![Sync::SIGNATURE_HASH, Swap::SIGNATURE_HASH]
}
