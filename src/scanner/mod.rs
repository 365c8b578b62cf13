pub mod decode;
pub mod scanner;

pub use decode::decode_log;
pub use scanner::{RangeScanner, ScanEnd};
