//! Metrics for API calls and session renewals.
//!
//! Everything goes through the `metrics` facade; a binary that wants the
//! numbers installs a recorder. Without one, every call here is a no-op.
//!
//! Label names: `endpoint`, `method`, `status`, `attempt`, `outcome`,
//! `error_category`.

use std::time::Duration;

use crate::endpoints::RequestLabels;
use crate::error::{AuthError, ClientError};

/// Histogram of request latency in seconds.
pub const METRIC_REQUEST_DURATION: &str = "tb_api_request_duration_seconds";

/// Counter of request attempts, retries included.
pub const METRIC_REQUESTS_TOTAL: &str = "tb_api_requests_total";

/// Counter of retried attempts after HTTP 429.
pub const METRIC_RETRIES_TOTAL: &str = "tb_api_retries_total";

/// Counter of failed requests by category.
pub const METRIC_ERRORS_TOTAL: &str = "tb_api_errors_total";

/// Counter of login attempts by outcome.
pub const METRIC_LOGINS_TOTAL: &str = "tb_auth_logins_total";

/// Counter of refresh attempts by outcome.
pub const METRIC_REFRESHES_TOTAL: &str = "tb_auth_refreshes_total";

/// Coarse classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// No response: connection, DNS or timeout.
    Transport,
    /// 4xx, including 404 and exhausted 429 retries.
    Http4xx,
    /// 5xx.
    Http5xx,
    /// The request was never sent because no credential could be obtained.
    Auth,
    Unknown,
}

impl ErrorCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transport => "transport",
            ErrorCategory::Http4xx => "http_4xx",
            ErrorCategory::Http5xx => "http_5xx",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Unknown => "unknown",
        }
    }
}

impl From<&ClientError> for ErrorCategory {
    fn from(error: &ClientError) -> Self {
        match error {
            ClientError::Auth(_) => ErrorCategory::Auth,
            ClientError::HttpError(_) => ErrorCategory::Transport,
            ClientError::NotFound(_)
            | ClientError::RateLimited(_)
            | ClientError::MaxRetriesExceeded(_) => ErrorCategory::Http4xx,
            ClientError::ApiError { status: 400..=499, .. } => ErrorCategory::Http4xx,
            ClientError::ApiError { status: 500..=599, .. } => ErrorCategory::Http5xx,
            _ => ErrorCategory::Unknown,
        }
    }
}

/// Which credential call an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthCall {
    Login,
    Refresh,
}

impl AuthCall {
    const fn metric(self) -> &'static str {
        match self {
            AuthCall::Login => METRIC_LOGINS_TOTAL,
            AuthCall::Refresh => METRIC_REFRESHES_TOTAL,
        }
    }
}

fn auth_outcome(error: Option<&AuthError>) -> &'static str {
    match error {
        None => "success",
        Some(AuthError::AuthenticationFailed(_) | AuthError::RefreshRejected(_)) => "rejected",
        Some(AuthError::Network(_)) => "network_error",
    }
}

/// Status label for a finished attempt; `None` when no response arrived.
fn response_status<T>(
    result: &Result<T, ClientError>,
    ok_status: impl Fn(&T) -> u16,
) -> Option<u16> {
    match result {
        Ok(value) => Some(ok_status(value)),
        Err(ClientError::ApiError { status, .. }) => Some(*status),
        Err(ClientError::NotFound(_)) => Some(404),
        Err(ClientError::RateLimited(_)) => Some(429),
        Err(_) => None,
    }
}

/// Records request and credential metrics with consistent labels.
///
/// Cheap to clone; a disabled collector records nothing even when a
/// recorder is installed.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    enabled: bool,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self { enabled: true }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Count one attempt of a request. `attempt` is 0 for the first send.
    pub fn record_attempt(&self, labels: RequestLabels<'_>, attempt: usize) {
        if !self.enabled {
            return;
        }

        let endpoint = labels.endpoint.to_string();
        let method = labels.method.to_string();

        if attempt > 0 {
            metrics::counter!(METRIC_RETRIES_TOTAL,
                "endpoint" => endpoint.clone(),
                "method" => method.clone(),
                "attempt" => attempt.to_string(),
            )
            .increment(1);
        }

        metrics::counter!(METRIC_REQUESTS_TOTAL, "endpoint" => endpoint, "method" => method)
            .increment(1);
    }

    /// Record how one attempt ended: latency always, the error category on failure.
    pub fn record_result<T>(
        &self,
        labels: RequestLabels<'_>,
        elapsed: Duration,
        result: &Result<T, ClientError>,
        ok_status: impl Fn(&T) -> u16,
    ) {
        if !self.enabled {
            return;
        }

        let status = response_status(result, ok_status)
            .map_or_else(|| "error".to_string(), |s| s.to_string());

        metrics::histogram!(METRIC_REQUEST_DURATION,
            "endpoint" => labels.endpoint.to_string(),
            "method" => labels.method.to_string(),
            "status" => status,
        )
        .record(elapsed.as_secs_f64());

        if let Err(error) = result {
            metrics::counter!(METRIC_ERRORS_TOTAL,
                "endpoint" => labels.endpoint.to_string(),
                "method" => labels.method.to_string(),
                "error_category" => ErrorCategory::from(error).as_str(),
            )
            .increment(1);
        }
    }

    /// Count a login or refresh by outcome.
    pub fn record_auth<T>(&self, call: AuthCall, result: &Result<T, AuthError>) {
        if !self.enabled {
            return;
        }

        let outcome = auth_outcome(result.as_ref().err());
        metrics::counter!(call.metric(), "outcome" => outcome).increment(1);
    }
}
