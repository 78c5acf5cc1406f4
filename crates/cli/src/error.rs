//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map `ClientError` and `AuthError` variants to appropriate exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Exit codes 1-8 are reserved for specific error categories.

use thingsboard_client::{AuthError, ClientError};

/// Structured exit codes for tb-cli.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Command completed successfully.
    Success = 0,

    /// Unhandled or generic failure (including configuration errors).
    GeneralError = 1,

    /// Login was rejected, the refresh token was rejected, or the server
    /// answered 401.
    ///
    /// Scripts should fix the credentials rather than retry.
    AuthenticationFailed = 2,

    /// Network, timeout, or DNS failure.
    ///
    /// Scripts may retry with exponential backoff.
    ConnectionError = 3,

    /// The requested entity does not exist.
    NotFound = 4,

    /// Bad parameters or a body the server could not use.
    ValidationError = 5,

    /// Insufficient privileges (HTTP 403).
    PermissionDenied = 6,

    /// HTTP 429 after retries were exhausted.
    RateLimited = 7,

    /// HTTP 502/503/504.
    ServiceUnavailable = 8,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&AuthError> for ExitCode {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed(_) | AuthError::RefreshRejected(_) => {
                ExitCode::AuthenticationFailed
            }
            AuthError::Network(_) => ExitCode::ConnectionError,
        }
    }
}

impl From<&ClientError> for ExitCode {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Auth(auth) => Self::from(auth),

            ClientError::NotFound(_) | ClientError::ApiError { status: 404, .. } => {
                ExitCode::NotFound
            }

            ClientError::InvalidResponse(_) | ClientError::ApiError { status: 400, .. } => {
                ExitCode::ValidationError
            }

            ClientError::ApiError { status: 401, .. } => ExitCode::AuthenticationFailed,
            ClientError::ApiError { status: 403, .. } => ExitCode::PermissionDenied,

            ClientError::RateLimited(_)
            | ClientError::MaxRetriesExceeded(_)
            | ClientError::ApiError { status: 429, .. } => ExitCode::RateLimited,

            ClientError::ApiError {
                status: 502..=504, ..
            } => ExitCode::ServiceUnavailable,

            ClientError::InvalidUrl(_) => ExitCode::ConnectionError,

            ClientError::HttpError(e) => {
                if e.is_connect() || e.is_timeout() {
                    ExitCode::ConnectionError
                } else {
                    ExitCode::GeneralError
                }
            }

            ClientError::ApiError { .. } => ExitCode::GeneralError,
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Extract the appropriate exit code from this error.
    ///
    /// Returns `ExitCode::GeneralError` if no client error is in the chain.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(client_err) = cause.downcast_ref::<ClientError>() {
                return ExitCode::from(client_err);
            }
            if let Some(auth_err) = cause.downcast_ref::<AuthError>() {
                return ExitCode::from(auth_err);
            }
        }

        ExitCode::GeneralError
    }
}
