//! ThingsBoard REST API client.
//!
//! This crate provides an authenticated client for the ThingsBoard REST API.
//! It supports username/password sessions (JWT access + refresh tokens with
//! single-flight renewal and clock-skew compensation) and static API keys.
//! Request and response payloads are passed through as JSON.

pub mod auth;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod metrics;
pub mod models;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use auth::{
    AuthScheme, AuthStrategy, Authenticator, Clock, HttpAuthenticator, SessionManager,
    SessionStatus, SystemClock, TokenState,
};
pub use client::ThingsBoardClient;
pub use client::builder::ThingsBoardClientBuilder;
pub use client::keepalive::KeepAliveHandle;
pub use error::{AuthError, ClientError, Result};
pub use metrics::{ErrorCategory, MetricsCollector};
