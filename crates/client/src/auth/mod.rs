//! Authentication strategies and session management.
//!
//! Submodules:
//! - [`token`]: immutable [`TokenState`] snapshots and unverified JWT claim decoding
//! - [`clock`]: injectable time source
//! - [`authenticator`]: the login/refresh network calls
//! - [`session`]: [`SessionManager`] and its renew-once protocol

pub mod authenticator;
pub mod clock;
pub mod session;
pub mod token;

use secrecy::SecretString;

pub use authenticator::{Authenticator, HttpAuthenticator};
pub use clock::{Clock, ManualClock, SystemClock};
pub use session::{SessionManager, SessionStatus};
pub use token::{Claims, TokenError, TokenState, decode_claims};

/// Strategy for authenticating with ThingsBoard.
#[derive(Debug, Clone)]
pub enum AuthStrategy {
    /// Username and password authentication.
    /// The client logs in and renews the JWT pair automatically.
    Session {
        username: String,
        password: SecretString,
    },
    /// Pre-shared API key. Never expires and is never renewed.
    ApiKey { key: SecretString },
}

/// The scheme word placed before the credential in `X-Authorization`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Bearer,
    ApiKey,
}

impl AuthScheme {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuthScheme::Bearer => "Bearer",
            AuthScheme::ApiKey => "ApiKey",
        }
    }
}

impl std::fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_scheme_header_words() {
        assert_eq!(AuthScheme::Bearer.as_str(), "Bearer");
        assert_eq!(AuthScheme::ApiKey.to_string(), "ApiKey");
    }

    #[test]
    fn test_auth_strategy_debug_redacts_secrets() {
        let strategy = AuthStrategy::Session {
            username: "tenant@thingsboard.org".to_string(),
            password: SecretString::new("super-secret-password".to_string().into()),
        };
        let debug_output = format!("{:?}", strategy);
        assert!(debug_output.contains("tenant@thingsboard.org"));
        assert!(!debug_output.contains("super-secret-password"));

        let strategy = AuthStrategy::ApiKey {
            key: SecretString::new("tb_abcdef123456".to_string().into()),
        };
        assert!(!format!("{:?}", strategy).contains("tb_abcdef123456"));
    }
}
