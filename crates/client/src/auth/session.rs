//! Session management with renew-once semantics.
//!
//! [`SessionManager::ensure_valid`] hands out a usable credential. In session
//! mode it runs a double-checked renewal:
//! - Fast path: read the current [`TokenState`] and return its access token if
//!   `now + clock_skew + margin < access_expires_at`. No network, no mutex.
//! - Slow path: take the renewal mutex, re-check, then refresh (if the refresh
//!   token is still usable and was not rejected) or log in.
//!
//! # Invariants
//! - The token pair is swapped as one `Arc`; readers never see a mixed pair
//! - At most one login/refresh is in flight per manager
//! - Callers queued behind a failed attempt get a clone of that attempt's error;
//!   the next call after that starts a fresh attempt
//! - A rejected refresh token is not used again; the next call logs in
//! - A rejected login is terminal: callers get the stored error without any
//!   network call until [`SessionManager::set_credentials`] or an explicit
//!   [`SessionManager::login`] succeeds
//! - A network failure leaves the held session untouched
//! - A keep-alive login only ever installs a new session; its failures are
//!   logged and leave every renewal flag as they were
//! - API-key mode never locks and never calls the authenticator

use secrecy::{ExposeSecret, SecretString};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::authenticator::Authenticator;
use crate::auth::clock::{Clock, SystemClock};
use crate::auth::token::TokenState;
use crate::auth::{AuthScheme, AuthStrategy};
use crate::error::AuthError;
use thingsboard_config::constants::DEFAULT_REQUEST_MARGIN_MS;

/// Observable state of a [`SessionManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Session mode, nothing obtained yet.
    NoSession,
    /// The access token passes the fast-path check.
    Valid,
    /// A token is held but the next call will renew it.
    Expiring,
    /// The last login was rejected.
    Unauthenticated,
    /// API-key mode.
    StaticKey,
}

#[derive(Debug)]
enum Mode {
    Session,
    ApiKey { key: SecretString },
}

#[derive(Debug)]
struct Credentials {
    username: String,
    password: SecretString,
}

/// State only touched while holding the renewal mutex.
#[derive(Debug, Default)]
struct RenewalState {
    credentials: Option<Credentials>,
    refresh_rejected: bool,
    /// Replayed to every caller while set.
    rejected_login: Option<AuthError>,
    /// Error of the most recent attempt and the generation it completed.
    last_failure: Option<(u64, AuthError)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Renewal {
    Refresh,
    Login,
}

/// Owns the current session and renews it on demand.
#[derive(Debug)]
pub struct SessionManager {
    mode: Mode,
    authenticator: Arc<dyn Authenticator>,
    clock: Arc<dyn Clock>,
    request_margin_ms: i64,
    state: RwLock<Option<Arc<TokenState>>>,
    renewal: Mutex<RenewalState>,
    /// Number of completed renewal attempts.
    generation: AtomicU64,
    unauthenticated: AtomicBool,
}

impl SessionManager {
    /// Create a manager for `strategy` that renews through `authenticator`.
    pub fn new(strategy: AuthStrategy, authenticator: Arc<dyn Authenticator>) -> Self {
        let (mode, credentials) = match strategy {
            AuthStrategy::Session { username, password } => {
                (Mode::Session, Some(Credentials { username, password }))
            }
            AuthStrategy::ApiKey { key } => (Mode::ApiKey { key }, None),
        };

        Self {
            mode,
            authenticator,
            clock: Arc::new(SystemClock),
            request_margin_ms: DEFAULT_REQUEST_MARGIN_MS as i64,
            state: RwLock::new(None),
            renewal: Mutex::new(RenewalState {
                credentials,
                ..RenewalState::default()
            }),
            generation: AtomicU64::new(0),
            unauthenticated: AtomicBool::new(false),
        }
    }

    /// Use `clock` as the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Renew tokens that expire within `margin_ms` of the compensated now.
    pub fn with_request_margin_ms(mut self, margin_ms: u64) -> Self {
        self.request_margin_ms = i64::try_from(margin_ms).unwrap_or(i64::MAX);
        self
    }

    /// Check if we're using API key auth (no session management needed).
    pub fn is_api_key(&self) -> bool {
        matches!(self.mode, Mode::ApiKey { .. })
    }

    /// The header scheme for the credentials this manager hands out.
    pub fn scheme(&self) -> AuthScheme {
        match self.mode {
            Mode::Session => AuthScheme::Bearer,
            Mode::ApiKey { .. } => AuthScheme::ApiKey,
        }
    }

    /// The renewal margin in milliseconds.
    pub fn request_margin_ms(&self) -> i64 {
        self.request_margin_ms
    }

    /// The currently held session, if any.
    pub fn snapshot(&self) -> Option<Arc<TokenState>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace_state(&self, state: Arc<TokenState>) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Some(state);
    }

    /// Report the session state as of now.
    pub fn status(&self) -> SessionStatus {
        if self.is_api_key() {
            return SessionStatus::StaticKey;
        }
        if self.unauthenticated.load(Ordering::Acquire) {
            return SessionStatus::Unauthenticated;
        }
        match self.snapshot() {
            None => SessionStatus::NoSession,
            Some(state) if state.access_usable_at(self.clock.now_ms(), self.request_margin_ms) => {
                SessionStatus::Valid
            }
            Some(_) => SessionStatus::Expiring,
        }
    }

    /// Return a credential usable for a request sent now.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] of the renewal attempt this call triggered or
    /// waited on.
    pub async fn ensure_valid(&self) -> Result<String, AuthError> {
        self.ensure_valid_at(self.clock.now_ms()).await
    }

    /// [`ensure_valid`](Self::ensure_valid) with an explicit local time in epoch ms.
    pub async fn ensure_valid_at(&self, now_ms: i64) -> Result<String, AuthError> {
        if let Mode::ApiKey { key } = &self.mode {
            return Ok(key.expose_secret().to_string());
        }

        let observed_generation = self.generation.load(Ordering::Acquire);
        if let Some(token) = self.usable_token(now_ms) {
            return Ok(token);
        }

        let mut renewal = self.renewal.lock().await;

        if let Some(token) = self.usable_token(now_ms) {
            debug!("Session renewed by a concurrent caller");
            return Ok(token);
        }

        if let Some(err) = &renewal.rejected_login {
            return Err(err.clone());
        }

        if let Some((generation, err)) = &renewal.last_failure
            && *generation > observed_generation
        {
            debug!("Renewal this call waited on failed");
            return Err(err.clone());
        }

        let kind = match self.snapshot() {
            Some(state)
                if !renewal.refresh_rejected
                    && state.refresh_usable_at(now_ms, self.request_margin_ms) =>
            {
                Renewal::Refresh
            }
            _ => Renewal::Login,
        };

        self.renew(&mut renewal, kind)
            .await
            .map(|state| state.access_token().to_string())
    }

    /// Log in with the stored credentials regardless of the held session.
    ///
    /// Succeeding here clears the rejected-login state.
    pub async fn login(&self) -> Result<Arc<TokenState>, AuthError> {
        if self.is_api_key() {
            return Err(AuthError::AuthenticationFailed(
                "Cannot login with API key auth strategy".to_string(),
            ));
        }

        let mut renewal = self.renewal.lock().await;
        self.renew(&mut renewal, Renewal::Login).await
    }

    /// Replace the stored credentials and leave the rejected-login state.
    ///
    /// No-op in API-key mode.
    pub async fn set_credentials(&self, username: String, password: SecretString) {
        if self.is_api_key() {
            warn!("Ignoring credentials for a client using API key auth");
            return;
        }

        let mut renewal = self.renewal.lock().await;
        renewal.credentials = Some(Credentials { username, password });
        renewal.rejected_login = None;
        renewal.last_failure = None;
        self.unauthenticated.store(false, Ordering::Release);
    }

    /// Best-effort pre-warming login used by the keep-alive task.
    ///
    /// A success replaces the held session. A failure is logged and dropped:
    /// it is not replayed to request callers and never makes the session
    /// unauthenticated. Skipped in API-key mode and while a request-path
    /// login is rejected.
    pub async fn keep_alive(&self) {
        if self.is_api_key() || self.unauthenticated.load(Ordering::Acquire) {
            return;
        }

        let mut renewal = self.renewal.lock().await;
        let Some(credentials) = &renewal.credentials else {
            return;
        };

        debug!(username = %credentials.username, "Keep-alive login");
        let result = self
            .authenticator
            .login(&credentials.username, credentials.password.expose_secret())
            .await;

        match result {
            Ok(state) => {
                self.install(&mut renewal, state);
                debug!("Keep-alive login succeeded");
            }
            Err(e) => warn!(error = %e, "Keep-alive login failed"),
        }
    }

    fn usable_token(&self, now_ms: i64) -> Option<String> {
        self.snapshot()
            .filter(|state| state.access_usable_at(now_ms, self.request_margin_ms))
            .map(|state| state.access_token().to_string())
    }

    /// Run one renewal attempt. Caller holds the renewal mutex.
    async fn renew(
        &self,
        renewal: &mut RenewalState,
        kind: Renewal,
    ) -> Result<Arc<TokenState>, AuthError> {
        let result = match kind {
            Renewal::Refresh => {
                debug!("Access token expiring, refreshing session");
                match self.snapshot() {
                    Some(state) => self.authenticator.refresh(state.refresh_token()).await,
                    None => Err(AuthError::RefreshRejected(
                        "No refresh token held".to_string(),
                    )),
                }
            }
            Renewal::Login => {
                let Some(credentials) = &renewal.credentials else {
                    return Err(AuthError::AuthenticationFailed(
                        "No credentials configured".to_string(),
                    ));
                };
                debug!(username = %credentials.username, "Logging in");
                self.authenticator
                    .login(&credentials.username, credentials.password.expose_secret())
                    .await
            }
        };

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        match result {
            Ok(state) => Ok(self.install(renewal, state)),
            Err(err) => {
                match (&err, kind) {
                    (AuthError::AuthenticationFailed(_), Renewal::Login) => {
                        warn!(error = %err, "Login rejected, session is unauthenticated");
                        renewal.rejected_login = Some(err.clone());
                        self.unauthenticated.store(true, Ordering::Release);
                    }
                    (AuthError::RefreshRejected(_), _) => {
                        warn!(error = %err, "Refresh token rejected, next renewal logs in");
                        renewal.refresh_rejected = true;
                    }
                    _ => warn!(error = %err, "Session renewal failed"),
                }
                renewal.last_failure = Some((generation, err.clone()));
                Err(err)
            }
        }
    }

    /// Swap in a freshly issued session and clear every failure flag.
    fn install(&self, renewal: &mut RenewalState, state: TokenState) -> Arc<TokenState> {
        let state = Arc::new(state);
        self.replace_state(Arc::clone(&state));
        renewal.refresh_rejected = false;
        renewal.rejected_login = None;
        renewal.last_failure = None;
        self.unauthenticated.store(false, Ordering::Release);
        state
    }
}
