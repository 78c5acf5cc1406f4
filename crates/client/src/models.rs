//! Wire models for the authentication endpoints and error bodies.
//!
//! Everything else the platform returns is passed through as opaque
//! `serde_json::Value`.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Body of `POST /api/auth/token`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response of both the login and the refresh endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub token: String,
    pub refresh_token: String,
}

/// Error body returned by ThingsBoard on non-2xx responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default)]
    pub error_code: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_request_uses_camel_case() {
        let body = serde_json::to_value(RefreshRequest {
            refresh_token: "r",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"refreshToken": "r"}));
    }

    #[test]
    fn test_token_pair_response_deserialization() {
        let json = r#"{"token":"access","refreshToken":"refresh","scope":null}"#;
        let pair: TokenPairResponse = serde_json::from_str(json).unwrap();
        assert_eq!(pair.token, "access");
        assert_eq!(pair.refresh_token, "refresh");
    }

    #[test]
    fn test_error_response_deserialization() {
        let json = r#"{
            "status": 401,
            "message": "Invalid username or password",
            "errorCode": 10,
            "timestamp": 1700000000000
        }"#;
        let err: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(err.message, "Invalid username or password");
        assert_eq!(err.error_code, Some(10));
    }
}
