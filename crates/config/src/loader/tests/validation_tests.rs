//! Validation tests for the configuration loader builder.
//!
//! Responsibilities:
//! - Test timeout bounds.
//! - Test max retries, request margin and keep-alive bounds.

use crate::constants::{
    MAX_KEEPALIVE_INTERVAL_SECS, MAX_MAX_RETRIES, MAX_REQUEST_MARGIN_MS, MAX_TIMEOUT_SECS,
};
use crate::loader::builder::ConfigLoader;
use crate::loader::error::ConfigError;
use serial_test::serial;
use std::time::Duration;

use super::env_lock;

fn base_loader() -> ConfigLoader {
    ConfigLoader::new()
        .with_base_url("https://tb.example.com".to_string())
        .with_api_key("tb_key".to_string())
}

#[test]
fn test_timeout_zero_invalid() {
    let result = base_loader().with_timeout(Duration::from_secs(0)).build();
    match result {
        Err(ConfigError::InvalidTimeout { message }) => {
            assert!(message.contains("must be greater than 0"), "got: {}", message);
        }
        other => panic!("Expected InvalidTimeout, got {:?}", other),
    }
}

#[test]
fn test_timeout_exceeds_max_invalid() {
    let result = base_loader()
        .with_timeout(Duration::from_secs(MAX_TIMEOUT_SECS + 1))
        .build();
    assert!(matches!(result, Err(ConfigError::InvalidTimeout { .. })));
}

#[test]
fn test_timeout_at_max_valid() {
    let result = base_loader()
        .with_timeout(Duration::from_secs(MAX_TIMEOUT_SECS))
        .build();
    assert!(result.is_ok());
}

#[test]
fn test_max_retries_bounds() {
    assert!(base_loader().with_max_retries(0).build().is_ok());
    assert!(base_loader().with_max_retries(MAX_MAX_RETRIES).build().is_ok());
    assert!(matches!(
        base_loader().with_max_retries(MAX_MAX_RETRIES + 1).build(),
        Err(ConfigError::InvalidMaxRetries { .. })
    ));
}

#[test]
fn test_request_margin_bounds() {
    assert!(base_loader().with_request_margin_ms(0).build().is_ok());
    assert!(
        base_loader()
            .with_request_margin_ms(MAX_REQUEST_MARGIN_MS)
            .build()
            .is_ok()
    );
    assert!(matches!(
        base_loader()
            .with_request_margin_ms(MAX_REQUEST_MARGIN_MS + 1)
            .build(),
        Err(ConfigError::InvalidRequestMargin { .. })
    ));
}

#[test]
fn test_keepalive_interval_bounds() {
    assert!(base_loader().with_keepalive_interval_secs(0).build().is_ok());
    assert!(matches!(
        base_loader()
            .with_keepalive_interval_secs(MAX_KEEPALIVE_INTERVAL_SECS + 1)
            .build(),
        Err(ConfigError::InvalidKeepAliveInterval { .. })
    ));
}

#[test]
#[serial]
fn test_max_retries_validated_from_env() {
    let _lock = env_lock().lock().unwrap();

    temp_env::with_vars([("TB_MAX_RETRIES", Some("99"))], || {
        let result = base_loader().from_env().unwrap().build();
        assert!(matches!(result, Err(ConfigError::InvalidMaxRetries { .. })));
    });
}
