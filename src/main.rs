//! Bybit Wallet Balance Logger
//!
//! Polls the Bybit v5 wallet balance endpoint on a fixed interval and appends
//! each reading to a CSV file (`timestamp,balance`).
//!
//! Usage:
//!   cargo run
//!   cargo run -- --interval 30 --csv-file data/balances.csv
//!   cargo run -- --testnet --once
//!
//! Environment:
//!   BYBIT_API_KEY, BYBIT_API_SECRET - required
//!   REQUEST_INTERVAL - seconds between polls (default: 60)
//!   CSV_FILE - output path (default: balances.csv)
//!   BYBIT_TESTNET - use testnet host

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use ::bybit_balance_logger::balance_api::BybitClient;
use ::bybit_balance_logger::config::{self, Config};
use ::bybit_balance_logger::poller::BalancePoller;
use ::bybit_balance_logger::shutdown::Shutdown;
use ::bybit_balance_logger::store::ObservationStore;
use ::bybit_balance_logger::types::BybitEnvironment;

#[derive(Parser, Debug)]
#[command(name = "bybit_balance_logger")]
#[command(about = "Poll Bybit wallet balance and append it to a CSV file")]
struct Args {
    /// Output CSV path (overrides CSV_FILE)
    #[arg(long)]
    csv_file: Option<PathBuf>,

    /// Seconds between polls (overrides REQUEST_INTERVAL)
    #[arg(long)]
    interval: Option<String>,

    /// Use testnet (overrides BYBIT_TESTNET)
    #[arg(long)]
    testnet: bool,

    /// Poll once, store the result, and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bybit_balance_logger=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let mut cfg = Config::from_env().context("Invalid configuration")?;
    if let Some(path) = args.csv_file {
        cfg.csv_file = path;
    }
    if let Some(raw) = args.interval.as_deref() {
        cfg.interval = config::parse_interval(raw).context("Invalid --interval")?;
    }
    if args.testnet {
        cfg.environment = BybitEnvironment::Testnet;
    }

    info!("========================================");
    info!("  Bybit Wallet Balance Logger");
    info!("========================================");
    info!("  Environment: {}", cfg.environment);
    info!("  API key:     {}...", cfg.auth.key_preview());
    info!("  Interval:    {}s", cfg.interval.as_secs());
    info!("  Output:      {}", cfg.csv_file.display());
    info!("========================================");

    let store = ObservationStore::new(&cfg.csv_file);
    store
        .ensure_initialized()
        .with_context(|| format!("Output file {} is not writable", cfg.csv_file.display()))?;

    let client = BybitClient::with_reqwest(cfg.auth.clone(), cfg.environment)
        .context("Failed to build HTTP client")?;
    let poller = BalancePoller::new(client, cfg.interval);

    if args.once {
        match poller.poll_once().await {
            Some(observation) => {
                store.append(&observation).context("Failed to store observation")?;
                info!("[MAIN] Stored balance {}", observation.balance);
            }
            None => warn!("[MAIN] No balance retrieved"),
        }
        return Ok(());
    }

    let shutdown = Arc::new(Shutdown::new());
    let signal = shutdown.subscribe();

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("[MAIN] Ctrl-C received, shutting down...");
                ctrl_c.trigger();
            }
            Err(e) => error!("[MAIN] Failed to listen for Ctrl-C: {}", e),
        }
    });

    let stats = poller.run(&store, signal).await;
    info!("[MAIN] Recorded {} observations", stats.appended);

    Ok(())
}
