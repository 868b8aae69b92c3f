//! HTTP middleware implementations
//!
//! - API key guard (verification plus plan rate limiting)
//! - Credential extraction and rate limit header helpers

mod guard;
mod helpers;


pub use guard::{ApiKeyGuard, ApiKeyGuardService, authenticated_key};
pub use helpers::{
    RATE_LIMIT_LIMIT, RATE_LIMIT_REMAINING, RATE_LIMIT_RESET, apply_rate_limit_headers,
    extract_api_key, rate_limited_response, unauthorized_response,
};
