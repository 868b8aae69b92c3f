//! Helper functions for middleware

use crate::core::rate_limiter::Decision;
use crate::utils::error::ErrorResponse;
use actix_web::{HttpResponse, web};
use actix_web::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;

pub const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Pull the request credential from, in order: the configured API key header,
/// `Authorization: Bearer|ApiKey <key>`, or the `api_key` query parameter.
pub fn extract_api_key(headers: &HeaderMap, header_name: &str, query: &str) -> Option<String> {
    if let Some(key) = headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .and_then(non_empty)
    {
        return Some(key);
    }

    if let Some(auth_str) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        if let Some(key) = auth_str
            .strip_prefix("Bearer ")
            .or_else(|| auth_str.strip_prefix("ApiKey "))
            .and_then(non_empty)
        {
            return Some(key);
        }
    }

    query_param(query, "api_key").and_then(|value| non_empty(&value))
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn query_param(query: &str, name: &str) -> Option<String> {
    web::Query::<HashMap<String, String>>::from_query(query)
        .ok()
        .and_then(|params| params.get(name).cloned())
}

/// Stamp the quota headers of a decision onto a response
pub fn apply_rate_limit_headers(headers: &mut HeaderMap, decision: &Decision) {
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(decision.limit()));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(decision.remaining()));
    headers.insert(RATE_LIMIT_RESET, HeaderValue::from(decision.reset_at()));
    if let Some(retry_after) = decision.retry_after() {
        headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    }
}

/// 401 with a message that does not reveal why the credential failed
pub fn unauthorized_response() -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse::new(
        "UNAUTHORIZED",
        "Invalid or missing API key",
    ))
}

/// 429 carrying the retry delay in both headers and body
pub fn rate_limited_response(decision: &Decision) -> HttpResponse {
    let retry_after = decision.retry_after().unwrap_or(1);
    let mut response = HttpResponse::TooManyRequests().json(
        ErrorResponse::new(
            "RATE_LIMIT_EXCEEDED",
            format!(
                "Rate limit of {} requests per window exceeded, retry in {} seconds",
                decision.limit(),
                retry_after
            ),
        )
        .with_retry_after(retry_after),
    );
    apply_rate_limit_headers(response.headers_mut(), decision);
    response
}
