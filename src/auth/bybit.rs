//! Bybit API authentication using HMAC-SHA256 query signatures.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ConfigError;
use crate::types::bybit::{params, RequestParameters};

type HmacSha256 = Hmac<Sha256>;

/// Bybit API credentials
#[derive(Clone)]
pub struct BybitAuth {
    pub api_key: String,
    secret: Vec<u8>,
}

impl BybitAuth {
    /// Create credentials. Empty key or secret is rejected.
    pub fn new(api_key: impl Into<String>, secret: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        let secret = secret.as_ref().to_vec();

        if api_key.is_empty() {
            return Err(ConfigError::EmptyCredential("BYBIT_API_KEY"));
        }
        if secret.is_empty() {
            return Err(ConfigError::EmptyCredential("BYBIT_API_SECRET"));
        }

        Ok(Self { api_key, secret })
    }

    /// First 8 characters of the API key, for logs
    pub fn key_preview(&self) -> String {
        self.api_key.chars().take(8).collect()
    }

    /// Get current timestamp in milliseconds
    #[inline]
    pub fn timestamp_ms() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as i64
    }

    /// Unsigned balance query parameters stamped with the current time
    pub fn build_parameters(&self) -> RequestParameters {
        build_parameters_at(&self.api_key, Self::timestamp_ms())
    }

    /// Sign a parameter set with this secret
    pub fn sign(&self, parameters: &RequestParameters) -> String {
        sign(&self.secret, parameters)
    }

    /// Build, sign, and attach `sign`. Fresh per request.
    pub fn signed_parameters(&self) -> RequestParameters {
        let mut parameters = self.build_parameters();
        let signature = self.sign(&parameters);
        parameters.insert(params::SIGN, signature);
        parameters
    }
}

impl fmt::Debug for BybitAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BybitAuth")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Balance query parameters for `api_key` at `timestamp_ms`
pub fn build_parameters_at(api_key: &str, timestamp_ms: i64) -> RequestParameters {
    let mut parameters = RequestParameters::new();
    parameters.insert(params::API_KEY, api_key);
    parameters.insert(params::TIMESTAMP, timestamp_ms);
    parameters.insert(params::ACCOUNT_TYPE, params::UNIFIED);
    parameters
}

/// HMAC-SHA256 over the sorted `name=value&...` payload, lowercase hex.
///
/// Example payload: "accountType=UNIFIED&api_key=K&timestamp=1000"
pub fn sign(secret: &[u8], parameters: &RequestParameters) -> String {
    let payload = parameters.signing_payload();
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::bybit::ParamValue;

    const SCENARIO_SIGNATURE: &str =
        "6c997133bc36ade8f67e77b8f429c85c132913000a9c572e1998da24dbc2b9d2";

    fn scenario_params() -> RequestParameters {
        build_parameters_at("K", 1000)
    }

    #[test]
    fn test_known_signature() {
        let p = scenario_params();
        assert_eq!(p.signing_payload(), "accountType=UNIFIED&api_key=K&timestamp=1000");
        assert_eq!(sign(b"abc", &p), SCENARIO_SIGNATURE);
    }

    #[test]
    fn test_signature_deterministic() {
        let p = scenario_params();
        assert_eq!(sign(b"abc", &p), sign(b"abc", &p));
    }

    #[test]
    fn test_signature_sensitive_to_each_value() {
        let base = sign(b"abc", &scenario_params());

        let mut p = scenario_params();
        p.insert(params::TIMESTAMP, 1001i64);
        let changed = sign(b"abc", &p);
        assert_ne!(base, changed);
        assert_eq!(
            changed,
            "6857cecfda25c20d91906b64a55c7b5e75afbfe77c2a99e572bb973153134a27"
        );

        let mut p = scenario_params();
        p.insert(params::API_KEY, "L");
        assert_ne!(base, sign(b"abc", &p));

        let mut p = scenario_params();
        p.insert(params::ACCOUNT_TYPE, "CONTRACT");
        assert_ne!(base, sign(b"abc", &p));

        assert_ne!(base, sign(b"abd", &scenario_params()));
    }

    #[test]
    fn test_signature_independent_of_insertion_order() {
        let forward: RequestParameters = vec![
            ("api_key", ParamValue::from("K")),
            ("timestamp", 1000i64.into()),
            ("accountType", "UNIFIED".into()),
        ]
        .into_iter()
        .collect();
        let reversed: RequestParameters = vec![
            ("accountType", ParamValue::from("UNIFIED")),
            ("timestamp", 1000i64.into()),
            ("api_key", "K".into()),
        ]
        .into_iter()
        .collect();

        assert_eq!(sign(b"abc", &forward), SCENARIO_SIGNATURE);
        assert_eq!(sign(b"abc", &reversed), SCENARIO_SIGNATURE);
    }

    #[test]
    fn test_sign_field_not_signed() {
        let mut p = scenario_params();
        p.insert(params::SIGN, "anything");
        assert_eq!(sign(b"abc", &p), SCENARIO_SIGNATURE);
    }

    #[test]
    fn test_signed_parameters() {
        let auth = BybitAuth::new("K", "abc").unwrap();
        let p = auth.signed_parameters();
        assert_eq!(p.len(), 4);
        assert_eq!(p.get(params::ACCOUNT_TYPE), Some(&ParamValue::from("UNIFIED")));

        let expected = sign(b"abc", &p);
        assert_eq!(p.get(params::SIGN), Some(&ParamValue::Str(expected)));
    }

    #[test]
    fn test_empty_credentials_rejected() {
        assert!(matches!(
            BybitAuth::new("K", ""),
            Err(ConfigError::EmptyCredential("BYBIT_API_SECRET"))
        ));
        assert!(matches!(
            BybitAuth::new("", "abc"),
            Err(ConfigError::EmptyCredential("BYBIT_API_KEY"))
        ));
    }

    #[test]
    fn test_key_preview() {
        let auth = BybitAuth::new("ABCDEFGHIJKL", "abc").unwrap();
        assert_eq!(auth.key_preview(), "ABCDEFGH");

        let auth = BybitAuth::new("K", "abc").unwrap();
        assert_eq!(auth.key_preview(), "K");

        // Multi-byte characters straddling byte 8
        let auth = BybitAuth::new("ключ-ключ", "abc").unwrap();
        assert_eq!(auth.key_preview(), "ключ-клю");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let auth = BybitAuth::new("K", "supersecret").unwrap();
        let dbg = format!("{:?}", auth);
        assert!(dbg.contains("<redacted>"));
        assert!(!dbg.contains("supersecret"));
    }
}
