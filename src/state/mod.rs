pub mod checkpoint;
pub mod store;

pub use checkpoint::{
    BlockEvents, CheckpointedState, EventKind, EventMap, EventRecord, MergeOutcome, TxEvents,
};
pub use store::JsonStateFile;
