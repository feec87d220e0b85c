//! Config validation: path prefix shape.

use crate::config::{ClientConfig, FetcherConfig};
use crate::error::ConfigError;

/// A prefix must be rooted and must not end with a slash, so `{prefix}/resource/` is well formed.
pub fn validate_prefix(prefix: &str) -> Result<(), ConfigError> {
    if !prefix.starts_with('/') || prefix.ends_with('/') {
        return Err(ConfigError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

pub fn validate(config: &FetcherConfig) -> Result<(), ConfigError> {
    validate_prefix(&config.path_prefix)?;
    if config.max_body_bytes == 0 {
        return Err(ConfigError::Load("max_body_bytes must be greater than zero".into()));
    }
    Ok(())
}

/// Clients build `{prefix}/resource/...` from the same prefix the server routes on.
pub fn validate_client(config: &ClientConfig) -> Result<(), ConfigError> {
    validate_prefix(&config.path_prefix)
}
