//! Common test utilities for integration tests.
//!
//! Shared helpers for building clients against a wiremock server and for
//! minting the token pairs the mock login/refresh endpoints return.
//!
//! # Invariants
//! - Tokens are unsigned JWTs; only `exp`/`iat` matter to the client
//! - Clients built here use a [`ManualClock`] so expiry is deterministic
//!
//! # What this does NOT handle
//! - Mock server setup (use wiremock directly in tests)

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

// Re-export commonly used types for test convenience
#[allow(unused_imports)]
pub use reqwest::Client;
#[allow(unused_imports)]
pub use thingsboard_client::endpoints;
#[allow(unused_imports)]
pub use thingsboard_client::testing::{CountingAuthenticator, ManualClock, issued, mint_jwt};
#[allow(unused_imports)]
pub use thingsboard_client::{AuthError, AuthStrategy, ClientError, ThingsBoardClient};
#[allow(unused_imports)]
pub use wiremock::{Mock, MockServer, ResponseTemplate};

/// Local "now" used by most tests: 1,000,000 s after the epoch, in ms.
#[allow(dead_code)]
pub const NOW_MS: i64 = 1_000_000_000;

/// `NOW_MS` in epoch seconds, for JWT claims.
#[allow(dead_code)]
pub const NOW_SECS: i64 = NOW_MS / 1000;

#[allow(dead_code)]
pub fn session_strategy() -> AuthStrategy {
    AuthStrategy::Session {
        username: "tenant@thingsboard.org".to_string(),
        password: SecretString::new("tenant".to_string().into()),
    }
}

#[allow(dead_code)]
pub fn api_key_strategy(key: &str) -> AuthStrategy {
    AuthStrategy::ApiKey {
        key: SecretString::new(key.to_string().into()),
    }
}

/// Body of a login/refresh response whose tokens were issued at `iat` and
/// expire after the given lifetimes (all seconds).
#[allow(dead_code)]
pub fn token_pair(iat: i64, access_ttl: i64, refresh_ttl: i64) -> serde_json::Value {
    serde_json::json!({
        "token": mint_jwt(Some(iat), iat + access_ttl),
        "refreshToken": mint_jwt(Some(iat), iat + refresh_ttl),
    })
}

/// A session-auth client for `server` driven by `clock`, with a 30 s margin.
#[allow(dead_code)]
pub fn session_client(server: &MockServer, clock: Arc<ManualClock>) -> ThingsBoardClient {
    ThingsBoardClient::builder()
        .base_url(server.uri())
        .auth_strategy(session_strategy())
        .clock(clock)
        .request_margin_ms(30_000)
        .build()
        .unwrap()
}

/// Advance Tokio's paused clock and let woken tasks run to their next await.
#[allow(dead_code)]
pub async fn advance_and_settle(duration: Duration) {
    tokio::time::advance(duration).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
