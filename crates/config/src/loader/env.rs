//! Environment variable parsing for configuration.
//!
//! Responsibilities:
//! - Read and parse `TB_*` environment variables.
//! - Apply environment variable values to a ConfigLoader instance.
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).
//! - Invalid numeric or boolean values return ConfigError::InvalidValue.

use std::str::FromStr;
use std::time::Duration;

use super::builder::ConfigLoader;
use super::error::ConfigError;

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Parse an environment variable into `T`, mapping parse failures to
/// `ConfigError::InvalidValue` with the given hint.
fn parse_env<T: FromStr>(key: &str, hint: &str) -> Result<Option<T>, ConfigError> {
    env_var_or_none(key)
        .map(|raw| {
            raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: key.to_string(),
                message: hint.to_string(),
            })
        })
        .transpose()
}

/// Layer the `TB_*` environment variables over `loader`.
pub fn apply_env(mut loader: ConfigLoader) -> Result<ConfigLoader, ConfigError> {
    if let Some(url) = env_var_or_none("TB_BASE_URL") {
        loader = loader.with_base_url(url);
    }
    if let Some(username) = env_var_or_none("TB_USERNAME") {
        loader = loader.with_username(username);
    }
    if let Some(password) = env_var_or_none("TB_PASSWORD") {
        loader = loader.with_password(password);
    }
    if let Some(key) = env_var_or_none("TB_API_KEY") {
        loader = loader.with_api_key(key);
    }
    if let Some(skip) = parse_env::<bool>("TB_SKIP_VERIFY", "must be true or false")? {
        loader = loader.with_skip_verify(skip);
    }
    if let Some(secs) = parse_env::<u64>("TB_TIMEOUT", "must be a number")? {
        loader = loader.with_timeout(Duration::from_secs(secs));
    }
    if let Some(retries) = parse_env::<usize>("TB_MAX_RETRIES", "must be a non-negative integer")?
    {
        loader = loader.with_max_retries(retries);
    }
    if let Some(margin) = parse_env::<u64>("TB_REQUEST_MARGIN_MS", "must be a number")? {
        loader = loader.with_request_margin_ms(margin);
    }
    if let Some(interval) = parse_env::<u64>("TB_KEEPALIVE_INTERVAL", "must be a number")? {
        loader = loader.with_keepalive_interval_secs(interval);
    }

    Ok(loader)
}
