//! Testing utilities for ThingsBoard client tests.
//!
//! Available when running tests or when the `test-utils` feature is enabled.
//!
//! # Example
//! ```ignore
//! use thingsboard_client::testing::{CountingAuthenticator, issued, mint_jwt};
//!
//! // An unsigned JWT the client will decode
//! let token = mint_jwt(Some(1_000), 1_060);
//!
//! // A scripted authenticator that counts round trips
//! let auth = CountingAuthenticator::new();
//! auth.push_login(Ok(issued("access-1", 1_001_000, 2_000_000)));
//! ```

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::auth::{Authenticator, TokenState};
use crate::error::AuthError;

pub use crate::auth::ManualClock;

/// Build an unsigned JWT carrying `exp` and, optionally, `iat` (epoch seconds).
pub fn mint_jwt(iat: Option<i64>, exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS512","typ":"JWT"}"#);
    let claims = match iat {
        Some(iat) => serde_json::json!({
            "sub": "tenant@thingsboard.org",
            "scopes": ["TENANT_ADMIN"],
            "iat": iat,
            "exp": exp,
        }),
        None => serde_json::json!({ "sub": "tenant@thingsboard.org", "exp": exp }),
    };
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.unsigned", header, payload)
}

/// A session with zero skew whose refresh token is `refresh-for-<access>`.
pub fn issued(access_token: &str, access_expires_at: i64, refresh_expires_at: i64) -> TokenState {
    TokenState::new(
        access_token,
        access_expires_at,
        format!("refresh-for-{}", access_token),
        refresh_expires_at,
        0,
    )
}

type Scripted = Mutex<VecDeque<Result<TokenState, AuthError>>>;

/// Scripted [`Authenticator`] that counts calls.
///
/// Results are served in push order; an empty queue answers with
/// `AuthError::Network`.
#[derive(Debug, Default)]
pub struct CountingAuthenticator {
    login_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
    login_results: Scripted,
    refresh_results: Scripted,
    last_login_password: Mutex<Option<String>>,
    last_refresh_token: Mutex<Option<String>>,
    delay: Option<Duration>,
}

impl CountingAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `delay` inside every call before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_login(&self, result: Result<TokenState, AuthError>) {
        lock(&self.login_results).push_back(result);
    }

    pub fn push_refresh(&self, result: Result<TokenState, AuthError>) {
        lock(&self.refresh_results).push_back(result);
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn last_login_password(&self) -> Option<String> {
        lock(&self.last_login_password).clone()
    }

    pub fn last_refresh_token(&self) -> Option<String> {
        lock(&self.last_refresh_token).clone()
    }

    async fn answer(&self, queue: &Scripted) -> Result<TokenState, AuthError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        lock(queue)
            .pop_front()
            .unwrap_or_else(|| Err(AuthError::Network("no scripted response".to_string())))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl Authenticator for CountingAuthenticator {
    async fn login(&self, _username: &str, password: &str) -> Result<TokenState, AuthError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_login_password) = Some(password.to_string());
        self.answer(&self.login_results).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenState, AuthError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_refresh_token) = Some(refresh_token.to_string());
        self.answer(&self.refresh_results).await
    }
}
