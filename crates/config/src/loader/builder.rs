//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` for layered configuration merging.
//! - Build and validate the final `Config`.
//!
//! Does NOT handle:
//! - Direct environment variable parsing logic (delegated to env.rs).
//!
//! Invariants / Assumptions:
//! - An API key takes precedence over username/password when both are present.
//! - The base URL is normalized to have no trailing slash.

use secrecy::SecretString;
use std::time::Duration;

use super::env::apply_env;
use super::error::ConfigError;
use crate::constants::{
    DEFAULT_KEEPALIVE_INTERVAL_SECS, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_MARGIN_MS,
    DEFAULT_TIMEOUT_SECS, MAX_KEEPALIVE_INTERVAL_SECS, MAX_MAX_RETRIES, MAX_REQUEST_MARGIN_MS,
    MAX_TIMEOUT_SECS,
};
use crate::types::{AuthConfig, AuthStrategy, Config, ConnectionConfig};

/// Configuration loader that builds config from environment variables and builder calls.
#[derive(Default)]
pub struct ConfigLoader {
    base_url: Option<String>,
    username: Option<String>,
    password: Option<SecretString>,
    api_key: Option<SecretString>,
    skip_verify: Option<bool>,
    timeout: Option<Duration>,
    max_retries: Option<usize>,
    request_margin_ms: Option<u64>,
    keepalive_interval_secs: Option<u64>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var("DOTENV_DISABLED").ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from .env file if present.
    ///
    /// If `DOTENV_DISABLED` is set to "true" or "1", the .env file is not loaded.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DotenvParse` or `ConfigError::DotenvIo` when the
    /// file exists but cannot be used. Missing `.env` files are ignored.
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    /// Check if a dotenv error indicates the file was not found.
    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Read configuration from `TB_*` environment variables.
    pub fn from_env(self) -> Result<Self, ConfigError> {
        apply_env(self)
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set the username.
    pub fn with_username(mut self, username: String) -> Self {
        self.username = Some(username);
        self
    }

    /// Set the password.
    pub fn with_password(mut self, password: String) -> Self {
        self.password = Some(SecretString::new(password.into()));
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: String) -> Self {
        self.api_key = Some(SecretString::new(key.into()));
        self
    }

    /// Set whether to skip TLS verification.
    pub fn with_skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = Some(skip);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set the access-token renewal margin in milliseconds.
    pub fn with_request_margin_ms(mut self, margin: u64) -> Self {
        self.request_margin_ms = Some(margin);
        self
    }

    /// Set the keep-alive interval in seconds (0 disables keep-alive).
    pub fn with_keepalive_interval_secs(mut self, interval: u64) -> Self {
        self.keepalive_interval_secs = Some(interval);
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> Result<Config, ConfigError> {
        let base_url = self
            .base_url
            .as_deref()
            .map(validate_and_normalize_base_url)
            .transpose()?
            .ok_or(ConfigError::MissingBaseUrl)?;

        let strategy = if let Some(key) = self.api_key {
            AuthStrategy::ApiKey { key }
        } else if let (Some(username), Some(password)) = (self.username, self.password) {
            AuthStrategy::Session { username, password }
        } else {
            return Err(ConfigError::MissingAuth);
        };

        let connection = ConnectionConfig {
            base_url,
            skip_verify: self.skip_verify.unwrap_or(false),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            request_margin_ms: self.request_margin_ms.unwrap_or(DEFAULT_REQUEST_MARGIN_MS),
            keepalive_interval_secs: self
                .keepalive_interval_secs
                .unwrap_or(DEFAULT_KEEPALIVE_INTERVAL_SECS),
        };

        Self::validate_connection(&connection)?;

        Ok(Config {
            connection,
            auth: AuthConfig { strategy },
        })
    }

    /// Validates numeric connection settings against their bounds.
    fn validate_connection(connection: &ConnectionConfig) -> Result<(), ConfigError> {
        let timeout_secs = connection.timeout.as_secs();

        if timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout {
                message: "timeout must be greater than 0 seconds".to_string(),
            });
        }

        if timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidTimeout {
                message: exceeds("timeout", timeout_secs, MAX_TIMEOUT_SECS, " seconds"),
            });
        }

        if connection.max_retries > MAX_MAX_RETRIES {
            return Err(ConfigError::InvalidMaxRetries {
                message: exceeds(
                    "max_retries",
                    connection.max_retries as u64,
                    MAX_MAX_RETRIES as u64,
                    "",
                ),
            });
        }

        if connection.request_margin_ms > MAX_REQUEST_MARGIN_MS {
            return Err(ConfigError::InvalidRequestMargin {
                message: exceeds(
                    "request_margin_ms",
                    connection.request_margin_ms,
                    MAX_REQUEST_MARGIN_MS,
                    " ms",
                ),
            });
        }

        if connection.keepalive_interval_secs > MAX_KEEPALIVE_INTERVAL_SECS {
            return Err(ConfigError::InvalidKeepAliveInterval {
                message: exceeds(
                    "keepalive_interval_secs",
                    connection.keepalive_interval_secs,
                    MAX_KEEPALIVE_INTERVAL_SECS,
                    " seconds",
                ),
            });
        }

        Ok(())
    }
}

fn exceeds(field: &str, got: u64, max: u64, unit: &str) -> String {
    format!("{field} is {got}{unit}, maximum is {max}{unit}")
}

/// Validate that a base URL is an absolute http(s) URL with a host, and strip
/// any trailing slash.
fn validate_and_normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(ConfigError::MissingBaseUrl);
    }

    let parsed = url::Url::parse(trimmed).map_err(|e| ConfigError::InvalidValue {
        var: "base_url".into(),
        message: format!(
            "must be an absolute http(s) URL with a host (e.g. https://thingsboard.example.com): {e}"
        ),
    })?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ConfigError::InvalidValue {
            var: "base_url".into(),
            message: format!("scheme must be http or https, got: {scheme}"),
        });
    }

    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidValue {
            var: "base_url".into(),
            message: "host is required (e.g. https://thingsboard.example.com)".into(),
        });
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
