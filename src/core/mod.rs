//! Core service logic
//!
//! Domain models, the plan rate limiter and the access gate that composes
//! key verification with rate limiting.

pub mod gate;
pub mod models;
pub mod rate_limiter;

pub use gate::{AccessGate, AccessOutcome};
