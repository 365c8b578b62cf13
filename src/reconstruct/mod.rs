pub mod engine;
pub mod units;

pub use engine::{reconstruct, SwapFact, TokenPair};
pub use units::{price_ratio, to_standard_units, u256_to_bigint};
