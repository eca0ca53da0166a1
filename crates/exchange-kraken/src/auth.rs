//! HMAC-SHA512 authentication for Kraken Futures.
//!
//! Each private request carries three headers:
//!
//! - `APIKey`: the public key
//! - `Authent`: `base64(HMAC-SHA512(base64decode(secret), SHA256(postData + nonce + endpoint)))`
//! - `Nonce`: optional, unix milliseconds followed by a 4-digit counter
//!
//! `endpoint` is the request path with any leading `/derivatives` removed.
//!
//! # Security
//!
//! - Secrets are read from environment variables and never logged
//! - The decoded secret is zeroized on drop

use crate::error::{KrakenError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256, Sha512};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use zeroize::Zeroize;

type HmacSha512 = Hmac<Sha512>;

const DERIVATIVES_PREFIX: &str = "/derivatives";

// =============================================================================
// Configuration
// =============================================================================

/// Which environment variables hold one account's key pair.
#[derive(Debug, Clone)]
pub struct KrakenAuthConfig {
    /// Environment variable name for the public API key.
    pub api_key_env: String,

    /// Environment variable name for the base64 API secret.
    pub secret_env: String,

    /// Send a `Nonce` header with every private request.
    pub use_nonce: bool,
}

impl Default for KrakenAuthConfig {
    fn default() -> Self {
        Self::source()
    }
}

impl KrakenAuthConfig {
    /// Creates config for the account being copied.
    #[must_use]
    pub fn source() -> Self {
        Self::new("SOURCE_KRAKEN_FUTURES_KEY", "SOURCE_KRAKEN_FUTURES_SECRET")
    }

    /// Creates config for the follower account.
    #[must_use]
    pub fn target() -> Self {
        Self::new("TARGET_KRAKEN_FUTURES_KEY", "TARGET_KRAKEN_FUTURES_SECRET")
    }

    #[must_use]
    pub fn new(api_key_env: impl Into<String>, secret_env: impl Into<String>) -> Self {
        Self {
            api_key_env: api_key_env.into(),
            secret_env: secret_env.into(),
            use_nonce: false,
        }
    }

    /// Enables or disables the `Nonce` header.
    #[must_use]
    pub fn with_nonce(mut self, use_nonce: bool) -> Self {
        self.use_nonce = use_nonce;
        self
    }
}

// =============================================================================
// Nonce
// =============================================================================

/// Produces `<unix millis><4-digit counter>` nonces, counter modulo 8192.
#[derive(Debug, Default)]
pub struct NonceGenerator {
    counter: AtomicU32,
}

impl NonceGenerator {
    /// Next nonce for the current wall-clock time.
    ///
    /// # Errors
    /// Returns error if the system clock is before the unix epoch.
    pub fn next(&self) -> Result<String> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| KrakenError::Signing(format!("failed to get timestamp: {e}")))?
            .as_millis();
        Ok(self.next_at(millis))
    }

    /// Next nonce for a fixed timestamp.
    pub fn next_at(&self, millis: u128) -> String {
        let count = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1) & 8191;
        format!("{millis}{count:04}")
    }
}

// =============================================================================
// Signed Headers
// =============================================================================

/// Headers required for an authenticated Kraken Futures request.
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    pub api_key: String,
    pub authent: String,
    pub nonce: Option<String>,
}

impl SignedHeaders {
    /// Returns headers as tuples for reqwest.
    #[must_use]
    pub fn as_tuples(&self) -> Vec<(&'static str, &str)> {
        let mut headers = vec![("APIKey", self.api_key.as_str()), ("Authent", self.authent.as_str())];
        if let Some(nonce) = &self.nonce {
            headers.push(("Nonce", nonce.as_str()));
        }
        headers
    }
}

// =============================================================================
// KrakenAuth
// =============================================================================

/// Request signer for one Kraken Futures account.
pub struct KrakenAuth {
    api_key: String,
    secret: Vec<u8>,
    nonce: Option<NonceGenerator>,
}

impl std::fmt::Debug for KrakenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KrakenAuth")
            .field("api_key", &self.api_key)
            .field("secret", &"[REDACTED]")
            .field("use_nonce", &self.nonce.is_some())
            .finish()
    }
}

impl Drop for KrakenAuth {
    fn drop(&mut self) {
        self.api_key.zeroize();
        self.secret.zeroize();
    }
}

impl KrakenAuth {
    /// Creates an authenticator from a public key and base64-encoded secret.
    ///
    /// # Errors
    /// Returns error if the secret is not valid base64.
    pub fn new(api_key: impl Into<String>, secret: &SecretString) -> Result<Self> {
        let secret = BASE64
            .decode(secret.expose_secret().trim())
            .map_err(|e| KrakenError::Signing(format!("API secret is not valid base64: {e}")))?;

        Ok(Self {
            api_key: api_key.into(),
            secret,
            nonce: None,
        })
    }

    /// Creates an authenticator from environment variables.
    ///
    /// # Errors
    /// Returns error if either variable is missing or the secret is invalid.
    pub fn from_env(config: &KrakenAuthConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            KrakenError::Configuration(format!(
                "missing environment variable: {}",
                config.api_key_env
            ))
        })?;

        let secret = std::env::var(&config.secret_env)
            .map(SecretString::from)
            .map_err(|_| {
                KrakenError::Configuration(format!(
                    "missing environment variable: {}",
                    config.secret_env
                ))
            })?;

        Ok(Self::new(api_key, &secret)?.with_nonce(config.use_nonce))
    }

    /// Enables or disables the `Nonce` header.
    #[must_use]
    pub fn with_nonce(mut self, use_nonce: bool) -> Self {
        self.nonce = use_nonce.then(NonceGenerator::default);
        self
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Signs a request to `endpoint` whose query string plus body is `post_data`.
    ///
    /// # Errors
    /// Returns error if a nonce or HMAC cannot be produced.
    pub fn sign_request(&self, endpoint: &str, post_data: &str) -> Result<SignedHeaders> {
        let nonce = self.nonce.as_ref().map(NonceGenerator::next).transpose()?;
        let authent = self.authent(endpoint, post_data, nonce.as_deref().unwrap_or(""))?;

        Ok(SignedHeaders {
            api_key: self.api_key.clone(),
            authent,
            nonce,
        })
    }

    /// Computes the `Authent` value.
    fn authent(&self, endpoint: &str, post_data: &str, nonce: &str) -> Result<String> {
        let path = endpoint.strip_prefix(DERIVATIVES_PREFIX).unwrap_or(endpoint);

        let digest = Sha256::new()
            .chain_update(post_data.as_bytes())
            .chain_update(nonce.as_bytes())
            .chain_update(path.as_bytes())
            .finalize();

        let mut mac = HmacSha512::new_from_slice(&self.secret)
            .map_err(|e| KrakenError::Signing(format!("invalid key length: {e}")))?;
        mac.update(&digest);

        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}

// =============================================================================
// Tests
// =============================================================================
