//! Configuration management for the ThingsBoard client.
//!
//! This crate provides types and loaders for managing ThingsBoard connection
//! and authentication configuration from environment variables, `.env` files
//! and explicit builder calls.

pub mod constants;
mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader, env_var_or_none};
pub use types::{AuthConfig, AuthStrategy, Config, ConnectionConfig};
