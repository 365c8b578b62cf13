use config::{Config, ConfigError, File};
use serde::Deserialize;

/// Node endpoint configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct NodeSettings {
    /// JSON-RPC HTTP endpoint. Can be overridden by the `NODE_URL`
    /// environment variable.
    pub url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_retry_min_delay_ms")]
    pub retry_min_delay_ms: u64,
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> usize {
    5
}

fn default_retry_min_delay_ms() -> u64 {
    500
}

/// Scanning range and chunk tuning.
///
/// The chunk bounds and the reorg safety margin are environment-dependent
/// (provider limits, typical reorg depth), so they are all exposed here
/// rather than hard-coded.
#[derive(Debug, Deserialize, Clone)]
pub struct ScanSettings {
    /// Pair contract whose logs are scanned.
    pub contract_address: String,
    /// First block of interest; the checkpoint never goes below it.
    pub first_block: u64,
    /// Last block to scan. Omit to scan to the chain tip (resolved once
    /// per invocation).
    #[serde(default)]
    pub last_block: Option<u64>,
    /// JSON checkpoint file.
    pub state_file: String,
    /// Trailing blocks re-fetched on resume to absorb short reorgs.
    #[serde(default = "default_safety_margin")]
    pub safety_margin: u64,
    #[serde(default = "default_min_chunk")]
    pub min_chunk: u64,
    #[serde(default = "default_max_chunk")]
    pub max_chunk: u64,
    #[serde(default = "default_start_chunk")]
    pub start_chunk: u64,
    /// Result count under which the next chunk doubles.
    #[serde(default = "default_chunk_growth_threshold")]
    pub chunk_growth_threshold: usize,
}

fn default_safety_margin() -> u64 {
    30
}

fn default_min_chunk() -> u64 {
    16
}

fn default_max_chunk() -> u64 {
    10_000
}

fn default_start_chunk() -> u64 {
    1_000
}

fn default_chunk_growth_threshold() -> usize {
    2_000
}

/// One side of the pair.
#[derive(Debug, Deserialize, Clone)]
pub struct TokenSettings {
    pub symbol: String,
    pub decimals: u8,
}

/// Token pair metadata used by the reconstruction engine.
#[derive(Debug, Deserialize, Clone)]
pub struct PairSettings {
    pub token0: TokenSettings,
    pub token1: TokenSettings,
}

/// Output artifacts.
#[derive(Debug, Deserialize, Clone)]
pub struct OutputSettings {
    /// CSV file for the reconstructed swap facts.
    pub csv_file: String,
    /// Date-to-block cache file.
    #[serde(default = "default_date_cache_file")]
    pub date_cache_file: String,
}

fn default_date_cache_file() -> String {
    "block_cache.json".to_string()
}

/// Root application configuration.
///
/// Loaded from `config.yaml` at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub node: NodeSettings,
    pub scan: ScanSettings,
    pub pair: PairSettings,
    pub output: OutputSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_file("config")
    }

    pub fn from_file(name: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(name))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }
}
