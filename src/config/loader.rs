//! Load server config from the environment (`FETCHER_PATH_PREFIX`, `FETCHER_MAX_BODY_BYTES`).

use crate::config::{validate, FetcherConfig};
use crate::error::ConfigError;

pub const PATH_PREFIX_VAR: &str = "FETCHER_PATH_PREFIX";
pub const MAX_BODY_BYTES_VAR: &str = "FETCHER_MAX_BODY_BYTES";

impl FetcherConfig {
    /// Defaults overridden by whichever variables are set. Call `dotenvy::dotenv()` first to honour `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`FetcherConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = FetcherConfig::default();
        if let Some(prefix) = lookup(PATH_PREFIX_VAR) {
            config.path_prefix = prefix.trim().to_string();
        }
        if let Some(raw) = lookup(MAX_BODY_BYTES_VAR) {
            config.max_body_bytes = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::Load(format!("{}: {}", MAX_BODY_BYTES_VAR, e)))?;
        }
        validate(&config)?;
        Ok(config)
    }
}
