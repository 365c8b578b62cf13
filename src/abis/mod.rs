pub mod pair;

pub use pair::{event_topics, Swap, Sync};
