//! Runtime configuration, built once at startup.
//!
//! Environment (a `.env` file is loaded first if present):
//! - `BYBIT_API_KEY`, `BYBIT_API_SECRET` - required credentials
//! - `REQUEST_INTERVAL` - poll interval in seconds (default: 60)
//! - `CSV_FILE` - output path (default: balances.csv)
//! - `BYBIT_TESTNET` - `true`/`1` to use the testnet host

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::BybitAuth;
use crate::error::ConfigError;
use crate::types::BybitEnvironment;

pub const DEFAULT_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_CSV_FILE: &str = "balances.csv";

/// Environment variable names
pub mod vars {
    pub const API_KEY: &str = "BYBIT_API_KEY";
    pub const API_SECRET: &str = "BYBIT_API_SECRET";
    pub const REQUEST_INTERVAL: &str = "REQUEST_INTERVAL";
    pub const CSV_FILE: &str = "CSV_FILE";
    pub const TESTNET: &str = "BYBIT_TESTNET";
}

/// Balance logger configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub auth: BybitAuth,
    pub interval: Duration,
    pub csv_file: PathBuf,
    pub environment: BybitEnvironment,
}

impl Config {
    /// Load from `.env` and the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(vars::API_KEY).ok_or(ConfigError::MissingVar(vars::API_KEY))?;
        let api_secret =
            lookup(vars::API_SECRET).ok_or(ConfigError::MissingVar(vars::API_SECRET))?;
        let auth = BybitAuth::new(api_key, api_secret)?;

        let interval = match lookup(vars::REQUEST_INTERVAL) {
            Some(raw) => parse_interval(&raw)?,
            None => Duration::from_secs(DEFAULT_INTERVAL_SECS),
        };

        let csv_file = lookup(vars::CSV_FILE)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_FILE));

        let environment = if lookup(vars::TESTNET).is_some_and(|v| parse_flag(&v)) {
            BybitEnvironment::Testnet
        } else {
            BybitEnvironment::Mainnet
        };

        Ok(Self {
            auth,
            interval,
            csv_file,
            environment,
        })
    }
}

/// Parse a positive whole number of seconds
pub fn parse_interval(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidInterval {
            value: raw.to_string(),
        }),
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
