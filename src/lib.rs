pub mod abis;
pub mod config;
pub mod error;
pub mod export;
pub mod locator;
pub mod node;
pub mod reconstruct;
pub mod scanner;
pub mod state;

pub use config::Settings;
pub use error::{NodeError, ScanError};
pub use locator::{BlockLocator, DateCache};
pub use node::{BlockHeader, NodeClient, RawLog, RpcNodeClient};
pub use reconstruct::{reconstruct, SwapFact, TokenPair};
pub use scanner::{RangeScanner, ScanEnd};
pub use state::{CheckpointedState, EventKind, EventRecord, JsonStateFile};
