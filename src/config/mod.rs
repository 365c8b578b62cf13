mod config;

pub use config::{
    NodeSettings, OutputSettings, PairSettings, ScanSettings, Settings, TokenSettings,
};
