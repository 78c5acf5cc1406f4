//! Request interceptor and client-level session helpers.
//!
//! # What this module does NOT handle:
//! - Token storage, expiry and renewal (handled by [`SessionManager`])
//! - Sending the request (handled by [`crate::endpoints::send_with_retry`])
//!
//! # Invariants
//! - The credential is obtained before every attempt, retries included; on
//!   failure the request never reaches the transport
//! - API key authentication never triggers login
//!
//! [`SessionManager`]: crate::auth::SessionManager

use std::sync::Arc;

use reqwest::RequestBuilder;
use reqwest::header::HeaderValue;
use thingsboard_config::constants::AUTH_HEADER;

use crate::auth::{SessionStatus, TokenState};
use crate::client::ThingsBoardClient;
use crate::error::{ClientError, Result};

impl ThingsBoardClient {
    /// Attach `X-Authorization` to `builder`, renewing the session if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] if no credential could be obtained.
    pub(crate) async fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.session.ensure_valid().await?;
        let mut value = HeaderValue::from_str(&format!("{} {}", self.session.scheme(), token))
            .map_err(|_| {
                ClientError::InvalidResponse("Credential is not a valid header value".to_string())
            })?;
        value.set_sensitive(true);
        Ok(builder.header(AUTH_HEADER, value))
    }

    /// Check if the client is using API key authentication.
    ///
    /// API keys do not expire and do not require session management.
    pub fn is_api_key_auth(&self) -> bool {
        self.session.is_api_key()
    }

    /// Log in with the configured credentials, replacing any held session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] if the strategy is API key based or the
    /// login fails.
    pub async fn login(&self) -> Result<Arc<TokenState>> {
        Ok(self.session.login().await?)
    }

    /// Current state of the session.
    pub fn session_status(&self) -> SessionStatus {
        self.session.status()
    }
}
