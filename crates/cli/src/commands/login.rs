//! Login command implementation.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use thingsboard_client::{ThingsBoardClient, TokenState};
use tracing::info;

pub async fn run(client: &ThingsBoardClient) -> Result<()> {
    if client.is_api_key_auth() {
        println!("Using API key authentication; there is no session to log in.");
        return Ok(());
    }

    info!("Logging in to {}", client.base_url());

    let state = client
        .login()
        .await
        .with_context(|| format!("Failed to log in to {}", client.base_url()))?;

    print!("{}", format_session(&state));
    Ok(())
}

/// Render the session's expiry times and measured clock skew.
fn format_session(state: &TokenState) -> String {
    format!(
        "Logged in.\n  Access token expires:  {}\n  Refresh token expires: {}\n  Clock skew:            {} ms\n",
        format_epoch_ms(state.access_expires_at()),
        format_epoch_ms(state.refresh_expires_at()),
        state.clock_skew(),
    )
}

fn format_epoch_ms(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}
