//! CLI commands for the position mirror.

pub mod plan;
pub mod run;

use anyhow::Result;
use mirror_core::{AppConfig, ConfigLoader, CredentialsConfig, MirrorEngine, MirrorError, Reconciler};
use mirror_kraken::{KrakenAuth, KrakenAuthConfig, KrakenClientConfig, KrakenFuturesClient};
use tracing::info;

pub type KrakenEngine = MirrorEngine<KrakenFuturesClient, KrakenFuturesClient, KrakenFuturesClient>;

/// Loads configuration, checks credentials, and wires the engine to Kraken.
pub fn build_engine(config_path: &str) -> Result<KrakenEngine> {
    let config = ConfigLoader::load(config_path)
        .map_err(|e| MirrorError::Configuration(format!("failed to load {config_path}: {e:#}")))?;

    check_credentials(&config.credentials, |name| std::env::var_os(name).is_some())?;

    info!(
        "mirroring via {} (nonce: {}, floors: target > {}, source > {})",
        config.kraken.api_url,
        config.kraken.use_nonce,
        config.equity.min_target_equity,
        config.equity.min_source_equity
    );

    engine_from_config(&config)
}

fn engine_from_config(config: &AppConfig) -> Result<KrakenEngine> {
    let client_config = KrakenClientConfig::from(&config.kraken);
    let credentials = &config.credentials;

    let account = |key_env: &str, secret_env: &str| -> Result<KrakenFuturesClient> {
        let auth_config =
            KrakenAuthConfig::new(key_env, secret_env).with_nonce(config.kraken.use_nonce);
        let auth = KrakenAuth::from_env(&auth_config)
            .map_err(|e| MirrorError::Configuration(e.to_string()))?;
        Ok(KrakenFuturesClient::authenticated(client_config.clone(), auth)?)
    };

    let market_data = KrakenFuturesClient::public(client_config.clone())?;
    let source = account(&credentials.source_key_env, &credentials.source_secret_env)?;
    let target = account(&credentials.target_key_env, &credentials.target_secret_env)?;

    Ok(MirrorEngine::new(
        market_data,
        source,
        target,
        Reconciler::new(config.equity),
    ))
}

/// Fails with every missing variable named, before any request is made.
fn check_credentials(
    credentials: &CredentialsConfig,
    is_set: impl Fn(&str) -> bool,
) -> std::result::Result<(), MirrorError> {
    let missing: Vec<&str> = credentials
        .env_vars()
        .into_iter()
        .filter(|name| !is_set(name))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MirrorError::Configuration(format!(
            "missing required environment variables: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_credentials_present() {
        assert!(check_credentials(&CredentialsConfig::default(), |_| true).is_ok());
    }

    #[test]
    fn test_every_missing_credential_is_reported() {
        let err = check_credentials(&CredentialsConfig::default(), |name| {
            name.starts_with("SOURCE_")
        })
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("TARGET_KRAKEN_FUTURES_KEY, TARGET_KRAKEN_FUTURES_SECRET"));
        assert!(!message.contains("SOURCE_"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_custom_variable_names_are_checked() {
        let credentials = CredentialsConfig {
            target_key_env: "FOLLOWER_KEY".to_string(),
            ..CredentialsConfig::default()
        };

        let err = check_credentials(&credentials, |name| name != "FOLLOWER_KEY").unwrap_err();
        assert!(err.to_string().ends_with("FOLLOWER_KEY"));
    }
}
