//! One-shot check of Bybit credentials and the wallet balance endpoint.
//!
//! Run with: cargo run --bin check_balance
//!
//! Steps:
//! 1. Load credentials from the environment
//! 2. Build and sign the request parameters
//! 3. Fetch the wallet balance once
//!
//! Nothing is written to disk.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use ::bybit_balance_logger::balance_api::BybitClient;
use ::bybit_balance_logger::config::Config;
use ::bybit_balance_logger::types::BybitEnvironment;

#[derive(Parser, Debug)]
#[command(name = "check_balance")]
#[command(about = "Fetch the Bybit wallet balance once")]
struct Args {
    /// Use testnet (default: value of BYBIT_TESTNET)
    #[arg(long)]
    testnet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bybit_balance_logger=debug".parse()?)
                .add_directive("check_balance=info".parse()?),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let cfg = Config::from_env().context("Failed to load Bybit credentials")?;
    let env = if args.testnet {
        BybitEnvironment::Testnet
    } else {
        cfg.environment
    };

    info!("========================================");
    info!("  Bybit Balance Check");
    info!("========================================");
    info!("  Environment: {}", env);
    info!("  API key:     {}...", cfg.auth.key_preview());
    info!("========================================");

    let client = BybitClient::with_reqwest(cfg.auth, env).context("Failed to build HTTP client")?;

    // --- Step 1: Sign ---
    info!("[STEP 1] Signing request...");
    let params = client.auth().signed_parameters();
    info!("  Payload: {}", params.signing_payload());

    // --- Step 2: Fetch ---
    info!("[STEP 2] Fetching {}...", client.wallet_balance_url());
    let balance = client
        .get_wallet_balance_with(&params)
        .await
        .context("Failed to get wallet balance")?;
    info!("  Total wallet balance: {}", balance);

    info!("========================================");
    info!("  Check passed");
    info!("========================================");

    Ok(())
}
