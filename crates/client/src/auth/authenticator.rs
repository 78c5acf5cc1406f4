//! The two network operations that produce a [`TokenState`].
//!
//! # What this module does NOT handle:
//! - Deciding between refresh and login (done by [`super::SessionManager`])
//! - Escalating a rejected refresh to a login
//!
//! # Invariants
//! - Non-2xx or an unusable body is `AuthenticationFailed` for login and
//!   `RefreshRejected` for refresh
//! - Transport failures (including exhausted 429 retries) are `Network`

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::auth::clock::Clock;
use crate::auth::token::TokenState;
use crate::endpoints::{self, RetryPolicy};
use crate::error::{AuthError, ClientError};
use crate::metrics::{AuthCall, MetricsCollector};
use crate::models::TokenPairResponse;

/// Performs login and refresh round trips.
#[async_trait]
pub trait Authenticator: Send + Sync + std::fmt::Debug {
    /// Log in with credentials and return the issued session.
    async fn login(&self, username: &str, password: &str) -> Result<TokenState, AuthError>;

    /// Exchange a refresh token for a new session.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenState, AuthError>;
}

/// [`Authenticator`] over the ThingsBoard `/api/auth` endpoints.
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
    metrics: Option<MetricsCollector>,
}

impl HttpAuthenticator {
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        retry: RetryPolicy,
        clock: Arc<dyn Clock>,
        metrics: Option<MetricsCollector>,
    ) -> Self {
        Self {
            http,
            base_url,
            retry,
            clock,
            metrics,
        }
    }

    fn record(&self, call: AuthCall, result: &Result<TokenState, AuthError>) {
        if let Some(m) = &self.metrics {
            m.record_auth(call, result);
        }
    }
}

/// Map a transport-layer error into the auth taxonomy. `rejected` builds the
/// variant used when the server answered but refused.
fn classify(error: ClientError, rejected: fn(String) -> AuthError) -> AuthError {
    match error {
        ClientError::ApiError {
            status, message, ..
        } => rejected(format!("HTTP {}: {}", status, message)),
        ClientError::NotFound(url) => rejected(format!("HTTP 404: {}", url)),
        ClientError::InvalidResponse(message) => rejected(message),
        ClientError::Auth(inner) => inner,
        other => AuthError::Network(other.to_string()),
    }
}

fn into_state(
    pair: TokenPairResponse,
    sent_at_ms: i64,
    rejected: fn(String) -> AuthError,
) -> Result<TokenState, AuthError> {
    TokenState::from_tokens(pair.token, pair.refresh_token, sent_at_ms)
        .map_err(|e| rejected(format!("Unusable token in response: {}", e)))
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn login(&self, username: &str, password: &str) -> Result<TokenState, AuthError> {
        let sent_at = self.clock.now_ms();
        let result = endpoints::login(
            &self.http,
            &self.base_url,
            username,
            password,
            self.retry,
            self.metrics.as_ref(),
        )
        .await
        .map_err(|e| classify(e, AuthError::AuthenticationFailed))
        .and_then(|pair| into_state(pair, sent_at, AuthError::AuthenticationFailed));

        if let Ok(state) = &result {
            debug!(
                access_expires_at = state.access_expires_at(),
                clock_skew_ms = state.clock_skew(),
                "Login succeeded"
            );
        }
        self.record(AuthCall::Login, &result);
        result
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenState, AuthError> {
        let sent_at = self.clock.now_ms();
        let result = endpoints::refresh(
            &self.http,
            &self.base_url,
            refresh_token,
            self.retry,
            self.metrics.as_ref(),
        )
        .await
        .map_err(|e| classify(e, AuthError::RefreshRejected))
        .and_then(|pair| into_state(pair, sent_at, AuthError::RefreshRejected));

        if let Ok(state) = &result {
            debug!(
                access_expires_at = state.access_expires_at(),
                clock_skew_ms = state.clock_skew(),
                "Refresh succeeded"
            );
        }
        self.record(AuthCall::Refresh, &result);
        result
    }
}
