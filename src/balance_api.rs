//! Bybit REST client for the wallet balance endpoint.
//!
//! Credentials are sent in the query string (`api_key`, `sign`) rather than
//! headers; the endpoint expects exactly this form.

use std::time::Duration;
use tracing::debug;

use crate::auth::BybitAuth;
use crate::error::PollError;
use crate::types::{BybitEnvironment, RequestParameters, WalletBalanceResponse};

/// Wallet balance endpoint path
pub const WALLET_BALANCE_PATH: &str = "/v5/account/wallet-balance";

/// Request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw HTTP response: status code and body text
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal "send GET, receive status + body" capability.
#[allow(async_fn_in_trait)]
pub trait BalanceTransport {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse, PollError>;
}

/// `reqwest`-backed transport
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, PollError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http })
    }
}

impl BalanceTransport for ReqwestTransport {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse, PollError> {
        let resp = self.http.get(url).query(query).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(HttpResponse { status, body })
    }
}

/// Bybit wallet balance client
pub struct BybitClient<T> {
    transport: T,
    auth: BybitAuth,
    env: BybitEnvironment,
    base_url: String,
}

impl BybitClient<ReqwestTransport> {
    /// Client over the default HTTP transport
    pub fn with_reqwest(auth: BybitAuth, env: BybitEnvironment) -> Result<Self, PollError> {
        Ok(Self::new(ReqwestTransport::new()?, auth, env))
    }
}

impl<T: BalanceTransport> BybitClient<T> {
    pub fn new(transport: T, auth: BybitAuth, env: BybitEnvironment) -> Self {
        Self {
            transport,
            auth,
            env,
            base_url: env.api_base_url().to_string(),
        }
    }

    /// Point the client at another host (e.g. a local stub)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn environment(&self) -> BybitEnvironment {
        self.env
    }

    pub fn auth(&self) -> &BybitAuth {
        &self.auth
    }

    /// Full endpoint URL for this environment
    pub fn wallet_balance_url(&self) -> String {
        format!("{}{}", self.base_url, WALLET_BALANCE_PATH)
    }

    /// Fetch the total wallet balance as a decimal string
    pub async fn get_wallet_balance(&self) -> Result<String, PollError> {
        let params = self.auth.signed_parameters();
        self.get_wallet_balance_with(&params).await
    }

    /// Fetch using an already signed parameter set
    pub async fn get_wallet_balance_with(
        &self,
        params: &RequestParameters,
    ) -> Result<String, PollError> {
        let url = self.wallet_balance_url();
        debug!("[BYBIT] GET {} ({})", url, params.signing_payload());

        let resp = self.transport.get(&url, &params.query_pairs()).await?;
        if !resp.is_success() {
            return Err(PollError::Status {
                status: resp.status,
                body: resp.body,
            });
        }

        parse_wallet_balance(&resp.body)
    }
}

/// Extract `totalWalletBalance` from a response body
pub fn parse_wallet_balance(body: &str) -> Result<String, PollError> {
    let data: WalletBalanceResponse = serde_json::from_str(body)?;

    if let Some((ret_code, ret_msg)) = data.rejection() {
        return Err(PollError::Api {
            ret_code,
            ret_msg: ret_msg.to_string(),
        });
    }

    data.total_wallet_balance().ok_or(PollError::MissingBalance)
}
