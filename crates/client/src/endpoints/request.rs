//! Retry helper for HTTP requests with exponential backoff.
//!
//! This module sends a request, retrying HTTP 429 responses with exponential
//! backoff and turning every other non-2xx response into a typed
//! [`ClientError`].
//!
//! # Invariants
//! - Each attempt is prepared from a fresh clone of the unprepared request,
//!   so credentials are attached per attempt and never outlive a backoff
//! - No single backoff sleep exceeds [`RetryPolicy::max_backoff`]
//!
//! # What this module does NOT handle:
//! - Obtaining credentials (the caller's `prepare` step does that)
//! - Retrying authentication failures; a 401 is returned to the caller as-is

use reqwest::{RequestBuilder, Response};
use std::future::ready;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;
use crate::models::ErrorResponse;
use thingsboard_config::constants::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};

/// Labels used when recording metrics for one request.
#[derive(Debug, Clone, Copy)]
pub struct RequestLabels<'a> {
    pub endpoint: &'a str,
    pub method: &'a str,
}

/// How rate-limited requests are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. 0 sends exactly once.
    pub max_retries: usize,
    /// Upper bound for one backoff sleep, server `Retry-After` included.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, max_backoff: Duration) -> Self {
        Self {
            max_retries,
            max_backoff,
        }
    }

    /// Sleep before retry number `attempt + 1`.
    pub fn backoff(&self, attempt: usize, retry_after: Option<Duration>) -> Duration {
        let exponential = Duration::from_secs(2u64.saturating_pow(attempt as u32));
        retry_after.unwrap_or(exponential).min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

/// Sends an unauthenticated HTTP request, retrying HTTP 429 responses.
///
/// See [`send_with_retry`].
///
/// # Errors
///
/// Returns `ClientError::MaxRetriesExceeded` when all retry attempts are exhausted.
pub async fn send_request_with_retry(
    builder: RequestBuilder,
    policy: RetryPolicy,
    labels: RequestLabels<'_>,
    metrics: Option<&MetricsCollector>,
) -> Result<Response> {
    send_with_retry(builder, policy, labels, metrics, |b| ready(Ok(b))).await
}

/// Sends an HTTP request with automatic retry logic for HTTP 429 responses.
///
/// `prepare` runs on a fresh clone of `builder` before every attempt; the
/// client uses it to attach a credential that is valid at send time.
///
/// - Backoff is `2^attempt` seconds, or the server's `Retry-After` when
///   present, capped at `policy.max_backoff`
/// - 404 becomes [`ClientError::NotFound`], other non-2xx [`ClientError::ApiError`]
///
/// # Errors
///
/// Returns `ClientError::MaxRetriesExceeded` when all retry attempts are
/// exhausted, or the error of a failed `prepare`.
pub async fn send_with_retry<F, Fut>(
    builder: RequestBuilder,
    policy: RetryPolicy,
    labels: RequestLabels<'_>,
    metrics: Option<&MetricsCollector>,
    mut prepare: F,
) -> Result<Response>
where
    F: FnMut(RequestBuilder) -> Fut,
    Fut: Future<Output = Result<RequestBuilder>>,
{
    let max_retries = policy.max_retries;

    for attempt in 0..=max_retries {
        let attempt_builder = match builder.try_clone() {
            Some(cloned) => cloned,
            None if attempt == 0 => {
                debug!("Request builder cannot be cloned, single attempt only");
                let prepared = prepare(builder).await?;
                return send_once(prepared, labels, metrics, 0).await;
            }
            None => return Err(ClientError::MaxRetriesExceeded(attempt)),
        };
        let attempt_builder = prepare(attempt_builder).await?;

        match send_once(attempt_builder, labels, metrics, attempt).await {
            Err(ClientError::RateLimited(retry_after)) if attempt < max_retries => {
                let backoff = policy.backoff(attempt, retry_after);
                debug!(
                    attempt = attempt + 1,
                    max_retries = max_retries + 1,
                    backoff_ms = backoff.as_millis() as u64,
                    "Rate limited (HTTP 429), retrying with backoff"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(ClientError::RateLimited(_)) => {
                debug!(
                    attempts = attempt + 1,
                    "Max retries exhausted for rate-limited request"
                );
                return Err(ClientError::MaxRetriesExceeded(max_retries + 1));
            }
            Ok(response) => {
                if attempt > 0 {
                    debug!(attempt = attempt + 1, "Request succeeded after retry");
                }
                return Ok(response);
            }
            Err(e) => return Err(e),
        }
    }

    Err(ClientError::MaxRetriesExceeded(max_retries + 1))
}

/// Send a single attempt and classify the response.
async fn send_once(
    builder: RequestBuilder,
    labels: RequestLabels<'_>,
    metrics: Option<&MetricsCollector>,
    attempt: usize,
) -> Result<Response> {
    if let Some(m) = metrics {
        m.record_attempt(labels, attempt);
    }

    let started = Instant::now();
    let result = match builder.send().await {
        Ok(response) => classify_response(response).await,
        Err(e) => Err(ClientError::from(e)),
    };

    if let Some(m) = metrics {
        m.record_result(labels, started.elapsed(), &result, |r| r.status().as_u16());
    }

    result
}

/// Map a response to `Ok` on 2xx, or to the matching error variant.
async fn classify_response(response: Response) -> Result<Response> {
    let status = response.status().as_u16();
    if response.status().is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();

    if status == 429 {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        return Err(ClientError::RateLimited(retry_after));
    }

    if status == 404 {
        return Err(ClientError::NotFound(url));
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response body".to_string());

    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) => parsed.message,
        Err(_) => body,
    };

    Err(ClientError::ApiError {
        status,
        url,
        message,
    })
}
