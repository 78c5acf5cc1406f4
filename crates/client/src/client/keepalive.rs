//! Background keep-alive for session authentication.
//!
//! A periodic task logs in on a fixed interval so the first request after a
//! long idle period finds a warm session. Failures, rejections included, are
//! logged and swallowed; they never change what request callers see.
//!
//! # Invariants
//! - The task never holds the renewal mutex between ticks
//! - Dropping the [`KeepAliveHandle`] stops the task
//! - Nothing is spawned for API key authentication

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::auth::SessionManager;
use crate::client::ThingsBoardClient;

/// Owns a running keep-alive task and aborts it on drop.
#[derive(Debug)]
pub struct KeepAliveHandle {
    task: JoinHandle<()>,
}

impl KeepAliveHandle {
    /// Stop the task now. Same as dropping the handle.
    pub fn stop(self) {
        self.task.abort();
    }

    /// Whether the task has exited. It only exits once stopped or aborted.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for KeepAliveHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn spawn_keepalive(session: Arc<SessionManager>, interval: Duration) -> KeepAliveHandle {
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            session.keep_alive().await;
        }
    });
    KeepAliveHandle { task }
}

impl ThingsBoardClient {
    /// Start logging in every `interval` in the background.
    ///
    /// Returns `None` for API key authentication or a zero interval.
    /// Must be called from within a tokio runtime.
    pub fn start_keepalive(&self, interval: Duration) -> Option<KeepAliveHandle> {
        if self.is_api_key_auth() || interval.is_zero() {
            return None;
        }
        debug!(interval_secs = interval.as_secs(), "Starting session keep-alive");
        Some(spawn_keepalive(Arc::clone(&self.session), interval))
    }

    /// Start the keep-alive with the interval configured at build time.
    pub fn start_configured_keepalive(&self) -> Option<KeepAliveHandle> {
        self.keepalive_interval
            .and_then(|interval| self.start_keepalive(interval))
    }
}
