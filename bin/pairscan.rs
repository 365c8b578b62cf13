use std::{env, path::Path, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{info, warn, LevelFilter};
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

use pairscan::{
    abis, export, reconstruct, BlockLocator, DateCache, JsonStateFile, RangeScanner,
    RpcNodeClient, ScanEnd, Settings, TokenPair,
};

#[derive(Parser)]
#[command(
    name = "pairscan",
    about = "Scan pair contract logs into a resumable checkpoint and reconstruct swap facts"
)]
struct Cli {
    /// Configuration file name, resolved by the config crate
    /// (e.g. "config" loads config.yaml).
    #[arg(short, long, default_value = "config")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the configured block range, then reconstruct and export (default).
    Scan,
    /// Reconstruct and export from the existing state file without touching the node.
    Export,
    /// Resolve a calendar date (YYYY-MM-DD, UTC midnight) to the closest block.
    BlockFromDate { date: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap();

    let cli = Cli::parse();
    let settings = Settings::from_file(&cli.config)
        .context("Failed to load config.yaml. Please ensure it exists and is valid")?;

    match cli.command.unwrap_or(Command::Scan) {
        Command::Scan => run_scan(&settings).await,
        Command::Export => run_export(&settings),
        Command::BlockFromDate { date } => run_block_from_date(&settings, &date).await,
    }
}

fn node_client(settings: &Settings) -> anyhow::Result<Arc<RpcNodeClient>> {
    let url = match env::var("NODE_URL") {
        Ok(url) => {
            warn!("NODE_URL environment variable is set, overriding the configured node url");
            url
        },
        Err(_) => settings.node.url.clone(),
    };

    Ok(Arc::new(RpcNodeClient::new(
        &url,
        &settings.scan.contract_address,
        abis::event_topics(),
        Duration::from_secs(settings.node.request_timeout_secs),
    )?))
}

async fn run_scan(settings: &Settings) -> anyhow::Result<()> {
    let client = node_client(settings)?;
    let scanner = RangeScanner::new(
        client,
        JsonStateFile::new(&settings.scan.state_file),
        &settings.scan,
        settings.node.max_retries,
        Duration::from_millis(settings.node.retry_min_delay_ms),
    );

    let cancellation_token = CancellationToken::new();
    let signal_token = cancellation_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal (Ctrl+C), stopping after the current chunk...");
            signal_token.cancel();
        }
    });

    let end = settings
        .scan
        .last_block
        .map(ScanEnd::Block)
        .unwrap_or(ScanEnd::Latest);
    let state = scanner.scan(end, &cancellation_token).await?;

    let facts = reconstruct(&state.events, &TokenPair::from(&settings.pair));
    export::write_csv(Path::new(&settings.output.csv_file), &facts)
}

fn run_export(settings: &Settings) -> anyhow::Result<()> {
    let state = JsonStateFile::new(&settings.scan.state_file).restore()?;
    let facts = reconstruct(&state.events, &TokenPair::from(&settings.pair));
    export::write_csv(Path::new(&settings.output.csv_file), &facts)
}

async fn run_block_from_date(settings: &Settings, date: &str) -> anyhow::Result<()> {
    let date =
        NaiveDate::parse_from_str(date, "%Y-%m-%d").context("Date must be YYYY-MM-DD")?;

    let mut cache = DateCache::restore(&settings.output.date_cache_file)?;
    let client = node_client(settings)?;
    let locator = BlockLocator::new(
        client,
        settings.node.max_retries,
        Duration::from_millis(settings.node.retry_min_delay_ms),
    );

    let block = locator.locate_date(date, &mut cache).await?;
    println!("{block}");
    Ok(())
}
