//! Configuration data models

#![allow(missing_docs)]

pub mod auth;
pub mod gateway;
pub mod logging;
pub mod rate_limit;
pub mod server;
pub mod storage;

pub use auth::*;
pub use gateway::*;
pub use logging::*;
pub use rate_limit::*;
pub use server::*;
pub use storage::*;

/// Default bind address
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8000
}

pub fn default_max_connections() -> u32 {
    10
}

/// Default connection timeout in seconds
pub fn default_connection_timeout() -> u64 {
    5
}

/// Default per-query timeout in milliseconds
pub fn default_query_timeout_ms() -> u64 {
    2_000
}

pub fn default_api_key_header() -> String {
    "X-API-KEY".to_string()
}

pub fn default_hash_salt() -> String {
    crate::utils::auth::crypto::keys::DEFAULT_HASH_SALT.to_string()
}

pub fn default_hash_iterations() -> u32 {
    crate::utils::auth::crypto::keys::DEFAULT_HASH_ITERATIONS
}

pub fn default_window_secs() -> u64 {
    60
}

pub fn default_cleanup_interval_secs() -> u64 {
    60
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub(crate) fn default_true() -> bool {
    true
}
