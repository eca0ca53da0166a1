use crate::reconcile::EquityFloors;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub kraken: KrakenConfig,
    pub equity: EquityFloors,
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KrakenConfig {
    pub api_url: String,
    pub timeout_secs: u64,
    pub use_nonce: bool,
    pub requests_per_minute: u32,
}

/// Names of the environment variables holding each account's API key pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub source_key_env: String,
    pub source_secret_env: String,
    pub target_key_env: String,
    pub target_secret_env: String,
}

impl CredentialsConfig {
    /// All four variable names, source first.
    #[must_use]
    pub fn env_vars(&self) -> [&str; 4] {
        [
            &self.source_key_env,
            &self.source_secret_env,
            &self.target_key_env,
            &self.target_secret_env,
        ]
    }
}

impl Default for KrakenConfig {
    fn default() -> Self {
        Self {
            api_url: "https://futures.kraken.com".to_string(),
            timeout_secs: 20,
            use_nonce: false,
            requests_per_minute: 60,
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            source_key_env: "SOURCE_KRAKEN_FUTURES_KEY".to_string(),
            source_secret_env: "SOURCE_KRAKEN_FUTURES_SECRET".to_string(),
            target_key_env: "TARGET_KRAKEN_FUTURES_KEY".to_string(),
            target_secret_env: "TARGET_KRAKEN_FUTURES_SECRET".to_string(),
        }
    }
}
