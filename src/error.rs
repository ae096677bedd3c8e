//! Error types for configuration, polling, and persistence.

use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration errors. Fatal: the process exits before polling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// The poll interval is not a positive integer number of seconds.
    #[error("invalid poll interval {value:?}: expected a positive integer number of seconds")]
    InvalidInterval { value: String },

    /// An API key or secret was provided but is empty.
    #[error("{0} must not be empty")]
    EmptyCredential(&'static str),
}

/// Failure of a single poll cycle. Always recoverable: the cycle is skipped.
#[derive(Debug, Error)]
pub enum PollError {
    /// Network-level failure (DNS, connect, timeout, reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// Endpoint answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Endpoint answered 2xx but rejected the request in its envelope.
    #[error("API error {ret_code}: {ret_msg}")]
    Api { ret_code: i64, ret_msg: String },

    /// Body is not valid JSON.
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Body parsed, but no `totalWalletBalance` value was present.
    #[error("response has no totalWalletBalance field")]
    MissingBalance,
}

impl PollError {
    /// True for network-level failures, false for response-level failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for PollError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Failure to persist an observation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV encoding error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(PollError::Transport("connection reset".into()).is_transport());
        assert!(!PollError::MissingBalance.is_transport());
        assert!(!PollError::Status { status: 502, body: String::new() }.is_transport());
    }

    #[test]
    fn test_error_display() {
        let err = PollError::Api { ret_code: 10003, ret_msg: "API key is invalid.".into() };
        assert_eq!(err.to_string(), "API error 10003: API key is invalid.");

        let err = StoreError::Io {
            path: PathBuf::from("/tmp/balances.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().starts_with("I/O error on /tmp/balances.csv"));
    }
}
