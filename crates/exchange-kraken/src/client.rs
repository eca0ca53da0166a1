//! Kraken Futures REST client with rate limiting.
//!
//! One client serves one account. A client built with [`KrakenFuturesClient::public`]
//! can only reach the public market-data endpoints.
//!
//! # Example
//!
//! ```ignore
//! use mirror_kraken::{KrakenAuth, KrakenAuthConfig, KrakenClientConfig, KrakenFuturesClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let auth = KrakenAuth::from_env(&KrakenAuthConfig::target())?;
//!     let client = KrakenFuturesClient::authenticated(KrakenClientConfig::default(), auth)?;
//!
//!     let equity = client.get_portfolio_value().await?;
//!     println!("portfolio value: {equity}");
//!     Ok(())
//! }
//! ```

use crate::auth::KrakenAuth;
use crate::error::{KrakenError, Result};
use crate::types::{
    RawAccountsResponse, RawCancelAllResponse, RawInstrumentsResponse,
    RawOpenPositionsResponse, RawSendOrderResponse, RawTicker, RawTickersResponse,
    SendOrderRequest,
};
use governor::{Quota, RateLimiter};
use mirror_core::{Instrument, KrakenConfig, Position, SubmissionResult, Ticker};
use nonzero_ext::nonzero;
use reqwest::{Client, Method};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, warn};

// =============================================================================
// Constants
// =============================================================================

/// Kraken Futures production base URL.
pub const KRAKEN_FUTURES_URL: &str = "https://futures.kraken.com";

pub const INSTRUMENTS_PATH: &str = "/derivatives/api/v3/instruments";
pub const TICKERS_PATH: &str = "/derivatives/api/v3/tickers";
pub const ACCOUNTS_PATH: &str = "/derivatives/api/v3/accounts";
pub const OPEN_POSITIONS_PATH: &str = "/derivatives/api/v3/openpositions";
pub const CANCEL_ALL_PATH: &str = "/derivatives/api/v3/cancelallorders";
pub const SEND_ORDER_PATH: &str = "/derivatives/api/v3/sendorder";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the Kraken Futures client.
#[derive(Debug, Clone)]
pub struct KrakenClientConfig {
    /// Base URL for the API.
    pub base_url: String,

    /// Requests per minute limit.
    pub requests_per_minute: NonZeroU32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for KrakenClientConfig {
    fn default() -> Self {
        Self {
            base_url: KRAKEN_FUTURES_URL.to_string(),
            requests_per_minute: nonzero!(60u32),
            timeout_secs: 20,
        }
    }
}

impl From<&KrakenConfig> for KrakenClientConfig {
    fn from(config: &KrakenConfig) -> Self {
        let defaults = Self::default();
        Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            requests_per_minute: NonZeroU32::new(config.requests_per_minute)
                .unwrap_or(defaults.requests_per_minute),
            timeout_secs: config.timeout_secs,
        }
    }
}

impl KrakenClientConfig {
    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

// =============================================================================
// KrakenFuturesClient
// =============================================================================

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Kraken Futures REST API client.
pub struct KrakenFuturesClient {
    config: KrakenClientConfig,
    http: Client,
    rate_limiter: Arc<DirectRateLimiter>,
    auth: Option<KrakenAuth>,
}

impl std::fmt::Debug for KrakenFuturesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KrakenFuturesClient")
            .field("base_url", &self.config.base_url)
            .field("requests_per_minute", &self.config.requests_per_minute)
            .field("authenticated", &self.auth.is_some())
            .finish_non_exhaustive()
    }
}

impl KrakenFuturesClient {
    /// Creates a client for public endpoints only.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn public(config: KrakenClientConfig) -> Result<Self> {
        Self::build(config, None)
    }

    /// Creates a client signing every private request with `auth`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn authenticated(config: KrakenClientConfig, auth: KrakenAuth) -> Result<Self> {
        Self::build(config, Some(auth))
    }

    fn build(config: KrakenClientConfig, auth: Option<KrakenAuth>) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KrakenError::Network(format!("failed to build HTTP client: {e}")))?;

        let quota = Quota::per_minute(config.requests_per_minute);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            config,
            http,
            rate_limiter,
            auth,
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Unsigned GET against a public endpoint.
    async fn get_public<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.config.base_url, endpoint);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Signed request. `body` is form-encoded and is the signed `postData`.
    async fn private<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: String,
    ) -> Result<T> {
        let auth = self.auth.as_ref().ok_or_else(|| {
            KrakenError::Authentication(format!("{endpoint} requires API credentials"))
        })?;

        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.config.base_url, endpoint);
        let headers = auth.sign_request(endpoint, &body)?;

        debug!("{} {} body_len={}", method, url, body.len());

        let mut request = self
            .http
            .request(method, &url)
            .header("Accept", "application/json");
        for (name, value) in headers.as_tuples() {
            request = request.header(name, value);
        }
        if !body.is_empty() {
            request = request
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(body);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Maps HTTP status and `"result": "error"` bodies to errors, then decodes.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(KrakenError::rate_limit(retry_after));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(KrakenError::api(status.as_u16(), text));
        }

        let body: serde_json::Value = response.json().await?;
        if body.get("result").and_then(serde_json::Value::as_str) == Some("error") {
            let message = body
                .get("error")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown error");
            return Err(KrakenError::api(status.as_u16(), message));
        }

        Ok(serde_json::from_value(body)?)
    }

    // =========================================================================
    // Public Endpoints
    // =========================================================================

    /// Gets every tradable futures contract.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn get_instruments(&self) -> Result<Vec<Instrument>> {
        let response: RawInstrumentsResponse = self.get_public(INSTRUMENTS_PATH).await?;

        let mut instruments = Vec::with_capacity(response.instruments.len());
        for raw in response.instruments {
            match raw.into_instrument() {
                Ok(instrument) => instruments.push(instrument),
                Err(reason) => warn!("skipping instrument {}", reason),
            }
        }
        Ok(instruments)
    }

    /// Gets mark prices for every listed symbol.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn get_tickers(&self) -> Result<Vec<Ticker>> {
        let response: RawTickersResponse = self.get_public(TICKERS_PATH).await?;
        Ok(response
            .tickers
            .into_iter()
            .filter_map(RawTicker::into_ticker)
            .collect())
    }

    // =========================================================================
    // Account Endpoints
    // =========================================================================

    /// Gets the flex account portfolio value (equity including unrealized PnL).
    ///
    /// # Errors
    /// Returns error if the API call fails or the value is missing.
    pub async fn get_portfolio_value(&self) -> Result<Decimal> {
        let response: RawAccountsResponse =
            self.private(Method::GET, ACCOUNTS_PATH, String::new()).await?;
        response.portfolio_value()
    }

    /// Gets open positions.
    ///
    /// # Errors
    /// Returns error if the API call fails or a position cannot be decoded.
    pub async fn get_open_positions(&self) -> Result<Vec<Position>> {
        let response: RawOpenPositionsResponse = self
            .private(Method::GET, OPEN_POSITIONS_PATH, String::new())
            .await?;

        response
            .open_positions
            .into_iter()
            .map(Position::try_from)
            .collect()
    }

    // =========================================================================
    // Order Endpoints
    // =========================================================================

    /// Cancels every open order on the account.
    ///
    /// # Returns
    /// The number of cancelled orders.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn cancel_all_orders(&self) -> Result<usize> {
        let response: RawCancelAllResponse = self
            .private(Method::POST, CANCEL_ALL_PATH, String::new())
            .await?;

        Ok(response
            .cancel_status
            .map(|s| s.cancelled_orders.len())
            .unwrap_or_default())
    }

    /// Sends a limit order.
    ///
    /// A venue-side refusal is returned as a rejected [`SubmissionResult`],
    /// not as an error.
    ///
    /// # Errors
    /// Returns error if the API call fails or the response has no send status.
    pub async fn send_order(&self, order: &SendOrderRequest) -> Result<SubmissionResult> {
        let response: RawSendOrderResponse = self
            .private(Method::POST, SEND_ORDER_PATH, order.to_form())
            .await?;

        let send_status = response
            .send_status
            .ok_or_else(|| KrakenError::missing_field("sendStatus"))?;

        let result = SubmissionResult::from(send_status);
        if !result.accepted {
            warn!("sendorder {} {}: {}", order.side, order.symbol, result.status);
        }
        Ok(result)
    }
}
