//! Authentication endpoints.

use reqwest::Client;
use tracing::debug;

use crate::endpoints::{RequestLabels, RetryPolicy, send_request_with_retry};
use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{LoginRequest, RefreshRequest, TokenPairResponse};
use thingsboard_config::constants::{LOGIN_PATH, REFRESH_PATH};

/// Login to ThingsBoard with username and password.
pub async fn login(
    client: &Client,
    base_url: &str,
    username: &str,
    password: &str,
    retry: RetryPolicy,
    metrics: Option<&MetricsCollector>,
) -> Result<TokenPairResponse> {
    debug!(username = %username, "Logging in to ThingsBoard");

    let url = format!("{}{}", base_url, LOGIN_PATH);
    let builder = client
        .post(&url)
        .json(&LoginRequest { username, password });
    let labels = RequestLabels {
        endpoint: LOGIN_PATH,
        method: "POST",
    };
    let response = send_request_with_retry(builder, retry, labels, metrics).await?;

    parse_token_pair(response).await
}

/// Exchange a refresh token for a new token pair.
pub async fn refresh(
    client: &Client,
    base_url: &str,
    refresh_token: &str,
    retry: RetryPolicy,
    metrics: Option<&MetricsCollector>,
) -> Result<TokenPairResponse> {
    debug!("Refreshing ThingsBoard session");

    let url = format!("{}{}", base_url, REFRESH_PATH);
    let builder = client.post(&url).json(&RefreshRequest { refresh_token });
    let labels = RequestLabels {
        endpoint: REFRESH_PATH,
        method: "POST",
    };
    let response = send_request_with_retry(builder, retry, labels, metrics).await?;

    parse_token_pair(response).await
}

async fn parse_token_pair(response: reqwest::Response) -> Result<TokenPairResponse> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        ClientError::InvalidResponse(format!("Missing token pair in response: {}", e))
    })
}
