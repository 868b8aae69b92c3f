//! Logging setup
//!
//! Installs the global `tracing` subscriber. Verbosity comes from `RUST_LOG`
//! when set, otherwise from the configured level.

use crate::utils::error::{GatewayError, Result};
use tracing_subscriber::EnvFilter;

/// Default filter used when neither `RUST_LOG` nor the config names one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Build the filter for the subscriber
pub fn build_filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.unwrap_or(DEFAULT_LOG_LEVEL)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Initialize the global subscriber.
///
/// Fails if a subscriber has already been installed for this process.
pub fn init_logging(level: Option<&str>, json: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_target(false)
        .with_thread_ids(false);

    let installed = if json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| GatewayError::Internal(format!("Failed to initialize logging: {}", e)))
}
