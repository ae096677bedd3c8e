//! Type definitions for the Bybit v5 wallet balance endpoint.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Environment
// =============================================================================

/// Bybit environment selection (Testnet vs Mainnet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BybitEnvironment {
    #[default]
    Mainnet,
    Testnet,
}

impl BybitEnvironment {
    /// REST API base URL
    pub fn api_base_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://api.bybit.com",
            Self::Testnet => "https://api-testnet.bybit.com",
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mainnet => "MAINNET",
            Self::Testnet => "TESTNET",
        }
    }
}

impl fmt::Display for BybitEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameter names used by the wallet balance request.
pub mod params {
    pub const API_KEY: &str = "api_key";
    pub const TIMESTAMP: &str = "timestamp";
    pub const ACCOUNT_TYPE: &str = "accountType";
    pub const SIGN: &str = "sign";

    /// Account type selector sent with every balance query
    pub const UNIFIED: &str = "UNIFIED";
}

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// Query parameters for one request, kept sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParameters {
    entries: BTreeMap<String, ParamValue>,
}

impl RequestParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical `name=value&...` string in ascending name order, without `sign`.
    pub fn signing_payload(&self) -> String {
        self.entries
            .iter()
            .filter(|(name, _)| name.as_str() != params::SIGN)
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// All parameters as string pairs, ready for the query string.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for RequestParameters
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (name, value) in iter {
            out.insert(name, value);
        }
        out
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Response envelope of `GET /v5/account/wallet-balance`.
///
/// Bybit nests the balance under `result.list[0]`; a flat top-level
/// `totalWalletBalance` is also accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletBalanceResponse {
    #[serde(rename = "retCode")]
    pub ret_code: Option<i64>,
    #[serde(rename = "retMsg", default)]
    pub ret_msg: String,
    #[serde(rename = "totalWalletBalance")]
    pub total_wallet_balance: Option<Value>,
    pub result: Option<WalletBalanceResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletBalanceResult {
    #[serde(default)]
    pub list: Vec<WalletAccount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletAccount {
    #[serde(rename = "accountType")]
    pub account_type: Option<String>,
    #[serde(rename = "totalWalletBalance")]
    pub total_wallet_balance: Option<Value>,
}

impl WalletBalanceResponse {
    /// Non-zero `retCode` means the API rejected the request.
    pub fn rejection(&self) -> Option<(i64, &str)> {
        match self.ret_code {
            Some(code) if code != 0 => Some((code, self.ret_msg.as_str())),
            _ => None,
        }
    }

    /// Total wallet balance as a decimal string, if present.
    ///
    /// Zero is a valid balance; only an absent, null, or empty value yields `None`.
    pub fn total_wallet_balance(&self) -> Option<String> {
        if let Some(value) = self.total_wallet_balance.as_ref().and_then(balance_text) {
            return Some(value);
        }
        self.result
            .as_ref()?
            .list
            .first()?
            .total_wallet_balance
            .as_ref()
            .and_then(balance_text)
    }
}

fn balance_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// =============================================================================
// Observation
// =============================================================================

/// One timestamped balance reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub balance: String,
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, balance: impl Into<String>) -> Self {
        Self {
            timestamp,
            balance: balance.into(),
        }
    }

    /// Observation stamped with the current UTC time
    pub fn now(balance: impl Into<String>) -> Self {
        Self::new(Utc::now(), balance)
    }

    /// CSV row for this observation
    pub fn to_record(&self) -> ObservationRecord<'_> {
        ObservationRecord {
            timestamp: self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            balance: &self.balance,
        }
    }
}

/// Row layout of the balances CSV file.
#[derive(Debug, Serialize)]
pub struct ObservationRecord<'a> {
    pub timestamp: String,
    pub balance: &'a str,
}
