//! Error types for the ThingsBoard client.
//!
//! Two layers:
//! - [`AuthError`]: failures of the session core (login, refresh, transport during
//!   renewal). It is `Clone` so a single failed renewal can be handed to every
//!   caller that was waiting on it.
//! - [`ClientError`]: everything a REST call can fail with, wrapping `AuthError`.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors produced while obtaining or renewing a credential.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Login was rejected or returned an unusable body. Not retried until the
    /// caller supplies new credentials.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The refresh token was rejected by the server. The next renewal falls
    /// back to a full login.
    #[error("Refresh token rejected: {0}")]
    RefreshRejected(String),

    /// Transport failure while talking to the authentication endpoints. The
    /// held session is left untouched.
    #[error("Network error during authentication: {0}")]
    Network(String),
}

impl AuthError {
    /// Check if a later attempt may succeed without new credentials.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Errors that can occur during ThingsBoard client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Obtaining a credential for the request failed; the request was not sent.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API error response from ThingsBoard.
    #[error("API error ({status}) at {url}: {message}")]
    ApiError {
        status: u16,
        url: String,
        message: String,
    },

    /// The requested resource does not exist (HTTP 404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid response format from ThingsBoard.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// Rate limited - too many requests.
    #[error("Rate limited: retry after {0:?}")]
    RateLimited(Option<Duration>),

    /// Maximum retries exceeded.
    #[error("Maximum retries exceeded ({0} attempts)")]
    MaxRetriesExceeded(usize),

    /// Invalid URL or client configuration.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError(_) | Self::RateLimited(_) | Self::MaxRetriesExceeded(_) => true,
            Self::Auth(auth) => auth.is_transient(),
            Self::ApiError { status, .. } => Self::is_retryable_status(*status),
            _ => false,
        }
    }

    /// Check if an HTTP status code is retryable.
    ///
    /// Retryable status codes:
    /// - 429: Too Many Requests (rate limiting)
    /// - 502, 503, 504: transient gateway/server errors
    pub fn is_retryable_status(status: u16) -> bool {
        matches!(status, 429 | 502 | 503 | 504)
    }

    /// Check if this error indicates an authentication failure.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Self::Auth(_) => true,
            Self::ApiError { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_transient() {
        assert!(AuthError::Network("connection reset".to_string()).is_transient());
        assert!(!AuthError::AuthenticationFailed("bad credentials".to_string()).is_transient());
        assert!(!AuthError::RefreshRejected("expired".to_string()).is_transient());
    }

    #[test]
    fn test_error_is_retryable() {
        let err = ClientError::RateLimited(Some(Duration::from_secs(1)));
        assert!(err.is_retryable());

        let err = ClientError::Auth(AuthError::Network("timeout".to_string()));
        assert!(err.is_retryable());

        let err = ClientError::Auth(AuthError::AuthenticationFailed("nope".to_string()));
        assert!(!err.is_retryable());

        let err = ClientError::ApiError {
            status: 503,
            url: "http://tb/api/devices".to_string(),
            message: "unavailable".to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_error_is_auth_error() {
        let err = ClientError::Auth(AuthError::RefreshRejected("expired".to_string()));
        assert!(err.is_auth_error());

        let err = ClientError::ApiError {
            status: 401,
            url: "http://tb/api/devices".to_string(),
            message: "Token has expired".to_string(),
        };
        assert!(err.is_auth_error());

        let err = ClientError::NotFound("http://tb/api/device/x".to_string());
        assert!(!err.is_auth_error());
    }

    #[test]
    fn test_is_retryable_status() {
        assert!(ClientError::is_retryable_status(429));
        assert!(ClientError::is_retryable_status(502));
        assert!(ClientError::is_retryable_status(503));
        assert!(ClientError::is_retryable_status(504));

        assert!(!ClientError::is_retryable_status(400));
        assert!(!ClientError::is_retryable_status(401));
        assert!(!ClientError::is_retryable_status(404));
        assert!(!ClientError::is_retryable_status(500));
        assert!(!ClientError::is_retryable_status(200));
    }

    #[test]
    fn test_auth_error_display_is_transparent() {
        let err = ClientError::from(AuthError::AuthenticationFailed(
            "Invalid username or password".to_string(),
        ));
        assert_eq!(
            err.to_string(),
            "Authentication failed: Invalid username or password"
        );
    }
}
