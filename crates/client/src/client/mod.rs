//! Main ThingsBoard REST API client.
//!
//! This module provides the primary [`ThingsBoardClient`]. Every call goes
//! through the request interceptor in `session`, which obtains a credential
//! from the shared [`SessionManager`] before the request is sent.
//!
//! # Submodules
//! - [`builder`]: Client construction and configuration
//! - `session`: Request interceptor and session helpers (private module)
//! - `rest`: JSON pass-through methods
//! - [`keepalive`]: Background pre-warming of the session
//!
//! # What this module does NOT handle:
//! - Direct HTTP request implementation (delegated to [`crate::endpoints`])
//! - Token storage and renewal (delegated to [`crate::auth::SessionManager`])
//!
//! # Invariants
//! - Clones share one `SessionManager`, so they share one session and one renewal
//! - An auth failure aborts the call before it reaches the transport; there is
//!   no automatic re-authentication and retry on 401/403

pub mod builder;
pub mod keepalive;
mod rest;
mod session;

use std::sync::Arc;
use std::time::Duration;

use crate::auth::SessionManager;
use crate::endpoints::RetryPolicy;
use crate::metrics::MetricsCollector;

/// ThingsBoard REST API client.
///
/// # Creating a Client
///
/// Use [`ThingsBoardClient::builder()`] to create a new client:
///
/// ```rust,ignore
/// use thingsboard_client::{ThingsBoardClient, AuthStrategy};
/// use secrecy::SecretString;
///
/// let client = ThingsBoardClient::builder()
///     .base_url("https://thingsboard.example.com".to_string())
///     .auth_strategy(AuthStrategy::Session {
///         username: "tenant@thingsboard.org".to_string(),
///         password: SecretString::new("tenant".to_string().into()),
///     })
///     .build()?;
///
/// let device = client.get_optional("/api/device/123", &[]).await?;
/// ```
///
/// # Authentication
///
/// - `AuthStrategy::Session`: JWT pair obtained by login and renewed on demand
/// - `AuthStrategy::ApiKey`: static key sent as `ApiKey <key>`
#[derive(Debug, Clone)]
pub struct ThingsBoardClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) session: Arc<SessionManager>,
    pub(crate) retry: RetryPolicy,
    pub(crate) metrics: Option<MetricsCollector>,
    pub(crate) keepalive_interval: Option<Duration>,
}

impl ThingsBoardClient {
    /// Create a new client builder.
    ///
    /// This is the entry point for constructing a [`ThingsBoardClient`].
    pub fn builder() -> builder::ThingsBoardClientBuilder {
        builder::ThingsBoardClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session manager shared by this client and its clones.
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// The keep-alive interval configured at build time, if any.
    pub fn keepalive_interval(&self) -> Option<Duration> {
        self.keepalive_interval
    }
}
