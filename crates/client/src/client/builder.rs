//! Fluent construction of [`ThingsBoardClient`].
//!
//! The builder owns the transport settings (timeout, redirects, TLS) and wires
//! a [`SessionManager`] to an authenticator and a clock. It sends nothing.
//!
//! # Invariants
//! - `build()` fails without a base URL or an auth strategy
//! - Trailing slashes are stripped from the base URL
//! - `skip_verify` on an `http://` URL only logs a warning
//! - Without an injected authenticator, login/refresh share the client's
//!   `reqwest::Client`
//! - A zero keep-alive interval is the same as none

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{
    AuthStrategy, Authenticator, Clock, HttpAuthenticator, SessionManager, SystemClock,
};
use crate::client::ThingsBoardClient;
use crate::endpoints::RetryPolicy;
use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;
use thingsboard_config::{
    AuthStrategy as ConfigAuthStrategy, Config,
    constants::{
        DEFAULT_MAX_REDIRECTS, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_MARGIN_MS,
        DEFAULT_TIMEOUT_SECS,
    },
};

/// Builder for creating a new [`ThingsBoardClient`].
///
/// All configuration options have sensible defaults except for `base_url`
/// and `auth_strategy`, which are required.
///
/// # Example
///
/// ```rust,ignore
/// use thingsboard_client::{ThingsBoardClient, AuthStrategy};
/// use secrecy::SecretString;
///
/// let client = ThingsBoardClient::builder()
///     .base_url("https://thingsboard.example.com".to_string())
///     .auth_strategy(AuthStrategy::ApiKey {
///         key: SecretString::new("my-key".to_string().into()),
///     })
///     .timeout(Duration::from_secs(60))
///     .build()?;
/// ```
pub struct ThingsBoardClientBuilder {
    base_url: Option<String>,
    auth_strategy: Option<AuthStrategy>,
    skip_verify: bool,
    timeout: Duration,
    max_retries: usize,
    request_margin_ms: u64,
    keepalive_interval: Option<Duration>,
    metrics: Option<MetricsCollector>,
    clock: Option<Arc<dyn Clock>>,
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl Default for ThingsBoardClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            auth_strategy: None,
            skip_verify: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            request_margin_ms: DEFAULT_REQUEST_MARGIN_MS,
            keepalive_interval: None,
            metrics: None,
            clock: None,
            authenticator: None,
        }
    }
}

impl ThingsBoardClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL of the ThingsBoard server.
    ///
    /// This should include the protocol and port, e.g., `http://localhost:8080`.
    /// Trailing slashes will be automatically removed.
    pub fn base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set the authentication strategy.
    ///
    /// See [`AuthStrategy`] for available options.
    pub fn auth_strategy(mut self, strategy: AuthStrategy) -> Self {
        self.auth_strategy = Some(strategy);
        self
    }

    /// Set whether to skip TLS certificate verification.
    ///
    /// # Security Warning
    /// Only use this in development or testing environments. Token claims are
    /// trusted without signature checks because the channel is trusted;
    /// disabling verification removes that guarantee.
    pub fn skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = skip;
        self
    }

    /// Set the request timeout. Also bounds how long a caller can wait on a
    /// login or refresh.
    ///
    /// Default is 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retries after HTTP 429, backing off 1s, 2s, 4s... unless the server
    /// sends `Retry-After`. No single wait exceeds the request timeout.
    /// 0 disables retries. Default is 3.
    pub fn max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set how long before expiry (in ms, server time) the access token is renewed.
    ///
    /// Default is 30 000 ms.
    pub fn request_margin_ms(mut self, margin: u64) -> Self {
        self.request_margin_ms = margin;
        self
    }

    /// Set the interval used by [`ThingsBoardClient::start_configured_keepalive`].
    pub fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = Some(interval);
        self
    }

    /// Record request and login/refresh metrics through `metrics`.
    pub fn metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Use `clock` for expiry decisions and skew measurement.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replace the HTTP authenticator used for login and refresh.
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Create a client builder from configuration.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use thingsboard_client::ThingsBoardClient;
    /// use thingsboard_config::Config;
    ///
    /// let config = Config::default();
    /// let client = ThingsBoardClient::builder()
    ///     .from_config(&config)
    ///     .build()?;
    /// ```
    pub fn from_config(mut self, config: &Config) -> Self {
        let auth_strategy = match &config.auth.strategy {
            ConfigAuthStrategy::Session { username, password } => AuthStrategy::Session {
                username: username.clone(),
                password: password.clone(),
            },
            ConfigAuthStrategy::ApiKey { key } => AuthStrategy::ApiKey { key: key.clone() },
        };

        self.base_url = Some(config.connection.base_url.clone());
        self.auth_strategy = Some(auth_strategy);
        self.skip_verify = config.connection.skip_verify;
        self.timeout = config.connection.timeout;
        self.max_retries = config.connection.max_retries;
        self.request_margin_ms = config.connection.request_margin_ms;
        self.keepalive_interval = config.connection.keepalive_interval();
        self
    }

    /// Normalize a base URL by removing trailing slashes.
    ///
    /// - `"http://localhost:8080/"` -> `"http://localhost:8080"`
    /// - `"https://example.com//"` -> `"https://example.com"`
    fn normalize_base_url(url: String) -> String {
        url.trim_end_matches('/').to_string()
    }

    /// Build the [`ThingsBoardClient`] with the configured options.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if `base_url` or `auth_strategy`
    /// was not provided.
    /// Returns `ClientError::HttpError` if the HTTP client fails to build.
    pub fn build(self) -> Result<ThingsBoardClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::InvalidUrl("base_url is required".to_string()))?;
        let base_url = Self::normalize_base_url(base_url);

        let auth_strategy = self
            .auth_strategy
            .ok_or_else(|| ClientError::InvalidUrl("auth_strategy is required".to_string()))?;

        let mut http_builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(DEFAULT_MAX_REDIRECTS));

        if self.skip_verify {
            let is_https = base_url.starts_with("https://");
            if is_https {
                http_builder = http_builder.danger_accept_invalid_certs(true);
            } else {
                tracing::warn!(
                    "skip_verify=true has no effect on HTTP URLs. TLS verification only applies to HTTPS connections."
                );
            }
        }

        let http = http_builder.build()?;

        let retry = RetryPolicy::new(self.max_retries, self.timeout);
        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let authenticator = match self.authenticator {
            Some(authenticator) => authenticator,
            None => Arc::new(HttpAuthenticator::new(
                http.clone(),
                base_url.clone(),
                retry,
                Arc::clone(&clock),
                self.metrics.clone(),
            )),
        };

        let session = SessionManager::new(auth_strategy, authenticator)
            .with_clock(clock)
            .with_request_margin_ms(self.request_margin_ms);

        Ok(ThingsBoardClient {
            http,
            base_url,
            session: Arc::new(session),
            retry,
            metrics: self.metrics,
            keepalive_interval: self.keepalive_interval.filter(|i| !i.is_zero()),
        })
    }
}
