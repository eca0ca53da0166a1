use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by layering defaults, an optional TOML file, and
    /// `MIRROR_`-prefixed environment variables (`__` separates nested keys).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or a value has the wrong type.
    pub fn load(path: impl AsRef<Path>) -> Result<AppConfig> {
        let config: AppConfig = Self::figment(path).extract()?;
        Ok(config)
    }

    /// Loads from [`DEFAULT_CONFIG_PATH`].
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::load`].
    pub fn load_default() -> Result<AppConfig> {
        Self::load(DEFAULT_CONFIG_PATH)
    }

    fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("MIRROR_").split("__"))
    }
}
