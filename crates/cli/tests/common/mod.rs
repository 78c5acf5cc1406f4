//! Shared test utilities for tb-cli integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Mint token pairs for login mocks.
//!
//! Invariants / Assumptions:
//! - `TB_API_KEY` is set to "tb_test_key" unless removed by the test.

use assert_cmd::Command;
use std::time::{SystemTime, UNIX_EPOCH};
use thingsboard_client::testing::mint_jwt;

/// Returns a hermetic `tb-cli` command for integration testing.
///
/// It ensures:
/// - `DOTENV_DISABLED=1` is set to prevent local `.env` contamination.
/// - `TB_API_KEY` is set to a dummy value to satisfy config validation.
/// - Other `TB_*` variables are cleared to ensure no leakage from the host.
pub fn tb_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("tb-cli");

    cmd.env("DOTENV_DISABLED", "1");
    cmd.env("TB_API_KEY", "tb_test_key");

    cmd.env_remove("TB_BASE_URL")
        .env_remove("TB_USERNAME")
        .env_remove("TB_PASSWORD")
        .env_remove("TB_SKIP_VERIFY")
        .env_remove("TB_TIMEOUT")
        .env_remove("TB_MAX_RETRIES")
        .env_remove("TB_REQUEST_MARGIN_MS")
        .env_remove("TB_KEEPALIVE_INTERVAL");

    cmd
}

/// Returns a hermetic `tb-cli` command that logs in with username/password.
#[allow(dead_code)]
pub fn tb_session_cmd(base_url: &str) -> Command {
    let mut cmd = tb_cmd();
    cmd.env_remove("TB_API_KEY")
        .env("TB_BASE_URL", base_url)
        .env("TB_USERNAME", "ops@example.com")
        .env("TB_PASSWORD", "s3cret");
    cmd
}

/// A login/refresh response body issued now, with the given lifetimes.
///
/// Returns the access token alongside the body so tests can match the
/// `X-Authorization` header of follow-up requests.
#[allow(dead_code)]
pub fn token_pair_json(access_ttl_secs: i64, refresh_ttl_secs: i64) -> (String, serde_json::Value) {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();

    let access = mint_jwt(Some(now), now + access_ttl_secs);
    let body = serde_json::json!({
        "token": access,
        "refreshToken": mint_jwt(Some(now), now + refresh_ttl_secs),
    });
    (access, body)
}
