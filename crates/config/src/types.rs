//! Configuration types for the ThingsBoard client.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    DEFAULT_KEEPALIVE_INTERVAL_SECS, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_MARGIN_MS,
    DEFAULT_TIMEOUT_SECS,
};

/// Module for serializing SecretString as strings.
mod secret_string {
    use secrecy::{ExposeSecret, SecretString};
    use serde::{Deserialize as DeserializeTrait, Serialize as SerializeTrait};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        secret.expose_secret().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SecretString::new(s.into()))
    }
}

/// Strategy for authenticating with ThingsBoard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuthStrategy {
    /// Username and password; the client logs in and renews JWT sessions.
    #[serde(rename = "session")]
    Session {
        username: String,
        #[serde(with = "secret_string")]
        password: SecretString,
    },
    /// Pre-shared API key, sent as `ApiKey <key>` and never renewed.
    #[serde(rename = "api_key")]
    ApiKey {
        #[serde(with = "secret_string")]
        key: SecretString,
    },
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// The authentication strategy to use.
    #[serde(flatten)]
    pub strategy: AuthStrategy,
}

/// Module for serializing Duration as seconds (integer).
mod duration_seconds {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Connection configuration for a ThingsBoard server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Base URL of the server (e.g., https://thingsboard.example.com)
    pub base_url: String,
    /// Whether to skip TLS verification (for self-signed certificates)
    pub skip_verify: bool,
    /// Request timeout (serialized as seconds)
    #[serde(with = "duration_seconds")]
    pub timeout: Duration,
    /// Maximum number of retries for rate-limited requests (0 disables retries)
    pub max_retries: usize,
    /// Milliseconds of remaining access-token lifetime below which a token is renewed
    #[serde(default = "default_request_margin_ms")]
    pub request_margin_ms: u64,
    /// Keep-alive login interval in seconds (0 disables the background task)
    #[serde(default)]
    pub keepalive_interval_secs: u64,
}

fn default_request_margin_ms() -> u64 {
    DEFAULT_REQUEST_MARGIN_MS
}

impl ConnectionConfig {
    fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            skip_verify: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            request_margin_ms: DEFAULT_REQUEST_MARGIN_MS,
            keepalive_interval_secs: DEFAULT_KEEPALIVE_INTERVAL_SECS,
        }
    }

    /// Keep-alive interval, or `None` when keep-alive is disabled.
    pub fn keepalive_interval(&self) -> Option<Duration> {
        (self.keepalive_interval_secs > 0)
            .then(|| Duration::from_secs(self.keepalive_interval_secs))
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Connection settings
    pub connection: ConnectionConfig,
    /// Authentication settings
    pub auth: AuthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_session(
            "http://localhost:8080".to_string(),
            "tenant@thingsboard.org".to_string(),
            SecretString::new("tenant".to_string().into()),
        )
    }
}

/// Demo accounts shipped with a fresh ThingsBoard install.
const DEMO_CREDENTIALS: &[(&str, &str)] = &[
    ("sysadmin@thingsboard.org", "sysadmin"),
    ("tenant@thingsboard.org", "tenant"),
    ("customer@thingsboard.org", "customer"),
];

impl Config {
    /// Check if the config uses one of the well-known demo accounts.
    pub fn is_using_default_credentials(&self) -> bool {
        use secrecy::ExposeSecret;

        match &self.auth.strategy {
            AuthStrategy::Session { username, password } => DEMO_CREDENTIALS
                .iter()
                .any(|(u, p)| username == u && password.expose_secret() == *p),
            AuthStrategy::ApiKey { .. } => false,
        }
    }

    /// Create a new config with the specified base URL and API key.
    pub fn with_api_key(base_url: String, key: SecretString) -> Self {
        Self {
            connection: ConnectionConfig::with_base_url(base_url),
            auth: AuthConfig {
                strategy: AuthStrategy::ApiKey { key },
            },
        }
    }

    /// Create a new config with the specified base URL and username/password.
    pub fn with_session(base_url: String, username: String, password: SecretString) -> Self {
        Self {
            connection: ConnectionConfig::with_base_url(base_url),
            auth: AuthConfig {
                strategy: AuthStrategy::Session { username, password },
            },
        }
    }
}
