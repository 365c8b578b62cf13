pub mod date_cache;
pub mod locator;

pub use date_cache::DateCache;
pub use locator::BlockLocator;
