//! Window arithmetic and maintenance for the rate limiter

use super::limiter::RateLimiter;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Start of the fixed window containing `now_secs`
pub fn window_start_for(now_secs: i64, window_secs: u64) -> i64 {
    let window = window_secs.max(1) as i64;
    now_secs.div_euclid(window) * window
}

/// Whole seconds from `now_millis` until `reset_at`, rounded up and at least 1
pub fn retry_after_seconds(reset_at: i64, now_millis: i64) -> u64 {
    let remaining_ms = reset_at.saturating_mul(1000).saturating_sub(now_millis);
    let secs = (remaining_ms + 999).div_euclid(1000);
    secs.max(1) as u64
}

impl RateLimiter {
    /// Drop windows older than the previous one. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Utc::now().timestamp())
    }

    /// The previous window survives so requests stamped just before a
    /// rollover still count against the counter they were stamped in.
    pub(super) fn cleanup_at(&self, now_secs: i64) -> usize {
        let current = window_start_for(now_secs, self.config.window_secs);
        let oldest_kept = current - self.config.window_secs.max(1) as i64;
        let before = self.windows.len();
        self.windows
            .retain(|_, counter| counter.window_start >= oldest_kept);
        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            debug!("Rate limiter cleanup removed {} stale windows", removed);
        }
        removed
    }

    /// Start background cleanup task
    pub fn start_cleanup_task(self: Arc<Self>) -> JoinHandle<()> {
        let period = Duration::from_secs(self.config.cleanup_interval_secs.max(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                self.cleanup();
            }
        })
    }

    /// Check if rate limiting is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Window length in seconds
    pub fn window_secs(&self) -> u64 {
        self.config.window_secs
    }
}
