//! Session token state and JWT claim decoding.
//!
//! # Trust boundary
//! Claims are read from the token payload WITHOUT verifying the signature.
//! The client only uses `exp` and `iat` to schedule its own renewals; it never
//! grants anything based on them. Authenticity comes from the TLS channel to
//! the configured server, and the server still verifies every token it gets.
//!
//! # Invariants
//! - All instants are epoch milliseconds (claims are converted from seconds).
//! - A [`TokenState`] is immutable; renewal builds a new one and swaps it in whole.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

/// Reasons a token cannot be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is not a three-part JWT")]
    NotAJwt,

    #[error("token payload is not valid base64url: {0}")]
    Encoding(String),

    #[error("token payload is not a valid claims object: {0}")]
    Claims(String),
}

/// The subset of JWT claims the session core consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Claims {
    /// Expiry, epoch seconds.
    pub exp: i64,
    /// Issued-at, epoch seconds.
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Decode the claims of a JWT without checking its signature.
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::NotAJwt);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| TokenError::Encoding(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| TokenError::Claims(e.to_string()))
}

fn secs_to_ms(secs: i64) -> i64 {
    secs.saturating_mul(1000)
}

/// Immutable snapshot of a session: both tokens, their expiries and the
/// measured clock skew.
#[derive(Debug, Clone)]
pub struct TokenState {
    access_token: SecretString,
    access_expires_at: i64,
    refresh_token: SecretString,
    refresh_expires_at: i64,
    clock_skew: i64,
}

impl TokenState {
    /// Build a state from already-known expiries (epoch ms) and skew (ms).
    pub fn new(
        access_token: impl Into<String>,
        access_expires_at: i64,
        refresh_token: impl Into<String>,
        refresh_expires_at: i64,
        clock_skew: i64,
    ) -> Self {
        Self {
            access_token: SecretString::new(access_token.into().into()),
            access_expires_at,
            refresh_token: SecretString::new(refresh_token.into().into()),
            refresh_expires_at,
            clock_skew,
        }
    }

    /// Build a state from a freshly issued token pair.
    ///
    /// `sent_at_ms` is the local time the login/refresh request was sent. The
    /// skew is the access token's `iat` minus that time; a token without `iat`
    /// yields a skew of zero.
    pub fn from_tokens(
        access_token: String,
        refresh_token: String,
        sent_at_ms: i64,
    ) -> Result<Self, TokenError> {
        let access = decode_claims(&access_token)?;
        let refresh = decode_claims(&refresh_token)?;
        let clock_skew = access
            .iat
            .map_or(0, |iat| secs_to_ms(iat).saturating_sub(sent_at_ms));

        Ok(Self::new(
            access_token,
            secs_to_ms(access.exp),
            refresh_token,
            secs_to_ms(refresh.exp),
            clock_skew,
        ))
    }

    /// The bearer credential.
    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// Access token expiry, epoch ms.
    pub fn access_expires_at(&self) -> i64 {
        self.access_expires_at
    }

    /// The refresh credential.
    pub fn refresh_token(&self) -> &str {
        self.refresh_token.expose_secret()
    }

    /// Refresh token expiry, epoch ms.
    pub fn refresh_expires_at(&self) -> i64 {
        self.refresh_expires_at
    }

    /// Server clock minus local clock, ms.
    pub fn clock_skew(&self) -> i64 {
        self.clock_skew
    }

    /// The local time `now_ms` translated to server time, plus `margin_ms`.
    pub fn deadline(&self, now_ms: i64, margin_ms: i64) -> i64 {
        now_ms
            .saturating_add(self.clock_skew)
            .saturating_add(margin_ms)
    }

    /// Whether the access token can still be sent at `now_ms`.
    pub fn access_usable_at(&self, now_ms: i64, margin_ms: i64) -> bool {
        self.deadline(now_ms, margin_ms) < self.access_expires_at
    }

    /// Whether the refresh token can still be exchanged at `now_ms`.
    pub fn refresh_usable_at(&self, now_ms: i64, margin_ms: i64) -> bool {
        self.deadline(now_ms, margin_ms) < self.refresh_expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mint_jwt;

    #[test]
    fn test_decode_claims() {
        let token = mint_jwt(Some(1_000), 1_001);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.exp, 1_001);
        assert_eq!(claims.iat, Some(1_000));
    }

    #[test]
    fn test_decode_claims_ignores_signature() {
        let token = mint_jwt(None, 42);
        let (unsigned, _) = token.rsplit_once('.').unwrap();
        let tampered = format!("{}.not-a-real-signature", unsigned);
        assert_eq!(decode_claims(&tampered).unwrap().exp, 42);
    }

    #[test]
    fn test_decode_claims_accepts_padded_payload() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"exp":7}"#);
        let token = format!("e30.{}==.sig", payload);
        assert_eq!(decode_claims(&token).unwrap().exp, 7);
    }

    #[test]
    fn test_decode_claims_rejects_non_jwt() {
        assert_eq!(decode_claims("opaque-session-key"), Err(TokenError::NotAJwt));
        assert_eq!(decode_claims("a.b.c.d"), Err(TokenError::NotAJwt));
    }

    #[test]
    fn test_decode_claims_rejects_bad_base64() {
        assert!(matches!(
            decode_claims("e30.!!!.sig"),
            Err(TokenError::Encoding(_))
        ));
    }

    #[test]
    fn test_decode_claims_requires_exp() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"tenant@thingsboard.org"}"#);
        let token = format!("e30.{}.sig", payload);
        assert!(matches!(decode_claims(&token), Err(TokenError::Claims(_))));
    }

    #[test]
    fn test_from_tokens_converts_to_millis() {
        let state = TokenState::from_tokens(
            mint_jwt(Some(1_000), 1_001),
            mint_jwt(Some(1_000), 2_000),
            1_000_000,
        )
        .unwrap();

        assert_eq!(state.access_expires_at(), 1_001_000);
        assert_eq!(state.refresh_expires_at(), 2_000_000);
        assert_eq!(state.clock_skew(), 0);
    }

    #[test]
    fn test_from_tokens_measures_skew() {
        // Server issued the token 5s after the local send time.
        let state = TokenState::from_tokens(
            mint_jwt(Some(1_005), 1_004),
            mint_jwt(Some(1_005), 2_000),
            1_000_000,
        )
        .unwrap();

        assert_eq!(state.clock_skew(), 5_000);
    }

    #[test]
    fn test_from_tokens_without_iat_has_no_skew() {
        let state =
            TokenState::from_tokens(mint_jwt(None, 1_001), mint_jwt(None, 2_000), 1_000_000)
                .unwrap();
        assert_eq!(state.clock_skew(), 0);
    }

    #[test]
    fn test_access_usable_boundary() {
        let state = TokenState::new("a", 1_001_000, "r", 2_000_000, 0);
        let margin = 30;

        // T - M - 1 is still usable, T - M is not.
        assert!(state.access_usable_at(1_001_000 - margin - 1, margin));
        assert!(!state.access_usable_at(1_001_000 - margin, margin));
    }

    #[test]
    fn test_skew_shortens_usable_window() {
        // Looks valid for another 4s locally, but the server is 5s ahead.
        let skewed = TokenState::new("a", 1_004_000, "r", 2_000_000, 5_000);
        assert!(!skewed.access_usable_at(1_000_000, 0));

        let unskewed = TokenState::new("a", 1_004_000, "r", 2_000_000, 0);
        assert!(unskewed.access_usable_at(1_000_000, 0));
    }

    #[test]
    fn test_refresh_usable_uses_same_deadline() {
        let state = TokenState::new("a", 1_001_000, "r", 2_000_000, 0);
        assert!(state.refresh_usable_at(1_999_969, 30));
        assert!(!state.refresh_usable_at(1_999_970, 30));
    }

    #[test]
    fn test_tokens_not_exposed_in_debug() {
        let state = TokenState::new("secret-access", 1, "secret-refresh", 2, 0);
        let debug_output = format!("{:?}", state);
        assert!(!debug_output.contains("secret-access"));
        assert!(!debug_output.contains("secret-refresh"));
    }
}
