pub mod client;
pub mod retry;
pub mod rpc;

pub use client::{BlockHeader, NodeClient, RawLog};
pub use retry::backoff_policy;
pub use rpc::RpcNodeClient;
