//! Core rate limiter implementation

use super::metrics::{RateLimitMetrics, RateLimitMetricsSnapshot};
#[cfg(feature = "redis")]
use super::redis_backend::RedisWindowStore;
use super::types::{Decision, WindowCounter};
use super::utils::{retry_after_seconds, window_start_for};
use crate::config::models::rate_limit::RateLimitConfig;
use crate::core::models::Plan;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::warn;

/// Per-identity fixed window rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Rate limit configuration
    pub(super) config: RateLimitConfig,
    /// Current window per identity
    pub(super) windows: Arc<DashMap<String, Arc<WindowCounter>>>,
    pub(super) metrics: Arc<RateLimitMetrics>,
    /// Shared counters; local windows are used when absent or failing
    #[cfg(feature = "redis")]
    pub(super) redis: Option<RedisWindowStore>,
}

impl RateLimiter {
    /// Create a new in-memory rate limiter
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(DashMap::new()),
            metrics: Arc::new(RateLimitMetrics::default()),
            #[cfg(feature = "redis")]
            redis: None,
        }
    }

    /// Count windows in Redis instead of process memory
    #[cfg(feature = "redis")]
    pub fn with_redis(mut self, store: RedisWindowStore) -> Self {
        self.redis = Some(store);
        self
    }

    /// Configured quota for a plan
    pub fn limit_for(&self, plan: Plan) -> u32 {
        self.config.plans.limit_for(plan)
    }

    /// Take one request slot for `identity`
    pub async fn check_and_consume(&self, identity: &str, plan: Plan) -> Decision {
        self.consume_at(identity, plan, Utc::now().timestamp_millis())
            .await
    }

    /// Take one request slot as of `now_ms` (unix milliseconds) on the
    /// configured backend
    pub async fn consume_at(&self, identity: &str, plan: Plan, now_ms: i64) -> Decision {
        #[cfg(feature = "redis")]
        if self.config.enabled {
            if let Some(redis) = &self.redis {
                match self.consume_shared(redis, identity, plan, now_ms).await {
                    Ok(decision) => return decision,
                    Err(e) => warn!("Redis rate limit backend failed, using local windows: {}", e),
                }
            }
        }

        self.check_and_consume_at(identity, plan, now_ms)
    }

    /// Take one request slot as of `now_ms` (unix milliseconds) using local windows
    pub fn check_and_consume_at(&self, identity: &str, plan: Plan, now_ms: i64) -> Decision {
        let limit = self.limit_for(plan);
        let window_start = window_start_for(now_ms.div_euclid(1000), self.config.window_secs);
        let reset_at = window_start + self.config.window_secs as i64;

        if !self.config.enabled {
            let decision = Decision::Allow {
                limit,
                remaining: limit,
                reset_at,
            };
            self.record(plan, &decision, identity);
            return decision;
        }

        let counter = self.counter_for(identity, window_start);
        let decision = match counter.try_acquire(limit) {
            Some(used) => Decision::Allow {
                limit,
                remaining: limit.saturating_sub(used),
                reset_at,
            },
            None => Decision::Deny {
                limit,
                remaining: 0,
                reset_at,
                retry_after_seconds: retry_after_seconds(reset_at, now_ms),
            },
        };

        self.record(plan, &decision, identity);
        decision
    }

    /// Current status without consuming a slot
    pub async fn peek(&self, identity: &str, plan: Plan) -> Decision {
        let now_ms = Utc::now().timestamp_millis();

        #[cfg(feature = "redis")]
        if self.config.enabled {
            if let Some(redis) = &self.redis {
                let window_start =
                    window_start_for(now_ms.div_euclid(1000), self.config.window_secs);
                match redis.current(identity, window_start).await {
                    Ok(used) => return self.status_from(plan, used, window_start, now_ms),
                    Err(e) => warn!("Redis rate limit backend failed, using local windows: {}", e),
                }
            }
        }

        self.peek_at(identity, plan, now_ms)
    }

    pub fn peek_at(&self, identity: &str, plan: Plan, now_ms: i64) -> Decision {
        let window_start = window_start_for(now_ms.div_euclid(1000), self.config.window_secs);
        if !self.config.enabled {
            return self.status_from(plan, 0, window_start, now_ms);
        }

        let used = self
            .windows
            .get(identity)
            .filter(|counter| counter.window_start == window_start)
            .map(|counter| u64::from(counter.used()))
            .unwrap_or(0);
        self.status_from(plan, used, window_start, now_ms)
    }

    /// Read-only copy of the limiter counters
    pub fn metrics(&self) -> RateLimitMetricsSnapshot {
        self.metrics.snapshot(self.windows.len())
    }

    /// Counter for the identity's current window, replacing a rolled-over one
    fn counter_for(&self, identity: &str, window_start: i64) -> Arc<WindowCounter> {
        if let Some(counter) = self.windows.get(identity) {
            if counter.window_start == window_start {
                return Arc::clone(counter.value());
            }
        }

        let mut entry = self
            .windows
            .entry(identity.to_string())
            .or_insert_with(|| Arc::new(WindowCounter::new(window_start)));
        if entry.window_start < window_start {
            *entry = Arc::new(WindowCounter::new(window_start));
        }
        Arc::clone(entry.value())
    }

    fn status_from(&self, plan: Plan, used: u64, window_start: i64, now_ms: i64) -> Decision {
        let limit = self.limit_for(plan);
        let reset_at = window_start + self.config.window_secs as i64;
        if used >= u64::from(limit) {
            Decision::Deny {
                limit,
                remaining: 0,
                reset_at,
                retry_after_seconds: retry_after_seconds(reset_at, now_ms),
            }
        } else {
            Decision::Allow {
                limit,
                remaining: limit - used as u32,
                reset_at,
            }
        }
    }

    fn record(&self, plan: Plan, decision: &Decision, identity: &str) {
        if decision.is_allowed() {
            self.metrics.record_allowed();
        } else {
            self.metrics.record_denied(plan);
            warn!(identity, plan = %plan, "Rate limit exceeded");
        }
    }

    #[cfg(feature = "redis")]
    async fn consume_shared(
        &self,
        redis: &RedisWindowStore,
        identity: &str,
        plan: Plan,
        now_ms: i64,
    ) -> crate::utils::error::Result<Decision> {
        let window_start = window_start_for(now_ms.div_euclid(1000), self.config.window_secs);
        let used = redis
            .increment(identity, window_start, self.config.window_secs)
            .await?;

        let limit = self.limit_for(plan);
        let reset_at = window_start + self.config.window_secs as i64;
        let decision = if used <= u64::from(limit) {
            Decision::Allow {
                limit,
                remaining: limit - used as u32,
                reset_at,
            }
        } else {
            Decision::Deny {
                limit,
                remaining: 0,
                reset_at,
                retry_after_seconds: retry_after_seconds(reset_at, now_ms),
            }
        };

        self.record(plan, &decision, identity);
        Ok(decision)
    }
}
