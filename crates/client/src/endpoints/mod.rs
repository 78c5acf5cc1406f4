//! REST API endpoint implementations.

mod auth;
mod request;

pub use auth::{login, refresh};
pub use request::{RequestLabels, RetryPolicy, send_request_with_retry, send_with_retry};
