//! Centralized constants for the ThingsBoard client workspace.
//!
//! This module contains default values used across crates to avoid
//! magic number duplication.

// =============================================================================
// Connection & Timeout Defaults
// =============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum allowed request timeout in seconds (1 hour).
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Default maximum number of HTTP redirects to follow.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Default maximum number of retries for rate-limited requests.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Maximum allowed value for `max_retries`.
pub const MAX_MAX_RETRIES: usize = 10;

// =============================================================================
// Session Defaults
// =============================================================================

/// Default safety margin, in milliseconds, subtracted from an access token's
/// lifetime before it is considered unusable for a new request.
pub const DEFAULT_REQUEST_MARGIN_MS: u64 = 30_000;

/// Maximum allowed request margin in milliseconds (10 minutes).
pub const MAX_REQUEST_MARGIN_MS: u64 = 600_000;

/// Default keep-alive login interval in seconds. Zero disables keep-alive.
pub const DEFAULT_KEEPALIVE_INTERVAL_SECS: u64 = 0;

/// Maximum allowed keep-alive interval in seconds (24 hours).
pub const MAX_KEEPALIVE_INTERVAL_SECS: u64 = 86_400;

// =============================================================================
// Authentication Endpoints
// =============================================================================

/// Path of the username/password login endpoint.
pub const LOGIN_PATH: &str = "/api/auth/login";

/// Path of the refresh-token exchange endpoint.
pub const REFRESH_PATH: &str = "/api/auth/token";

/// Header carrying the credential on every authorized request.
pub const AUTH_HEADER: &str = "X-Authorization";
