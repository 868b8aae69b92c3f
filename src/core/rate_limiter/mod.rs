//! Plan-based rate limiting
//!
//! Fixed windows aligned to wall-clock multiples of the window length, one
//! atomic counter per identity and window. Counters live in process memory,
//! or in Redis when the `redis` feature and backend are enabled.

mod limiter;
mod metrics;
#[cfg(feature = "redis")]
mod redis_backend;
mod types;
mod utils;


// Re-export public types
pub use limiter::RateLimiter;
pub use metrics::RateLimitMetricsSnapshot;
#[cfg(feature = "redis")]
pub use redis_backend::RedisWindowStore;
pub use types::Decision;
pub use utils::{retry_after_seconds, window_start_for};
