//! Environment variable overrides
//!
//! Values read from the environment take precedence over the config file.

use super::models::*;
use crate::utils::error::{GatewayError, Result};
use std::env;
use std::str::FromStr;
use tracing::debug;

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| GatewayError::Config(format!("Invalid {}: {}", name, e)))
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(GatewayError::Config(format!(
            "Invalid {}: expected a boolean, got '{}'",
            name, other
        ))),
    }
}

impl GatewayConfig {
    /// Defaults overlaid with the process environment
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides(|name| env::var(name).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!("Applying environment overrides");

        // Server configuration
        if let Some(host) = lookup("KEYGATE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("KEYGATE_PORT") {
            self.server.port = parse_var("KEYGATE_PORT", &port)?;
        }
        if let Some(workers) = lookup("KEYGATE_WORKERS") {
            self.server.workers = Some(parse_var("KEYGATE_WORKERS", &workers)?);
        }

        // Storage configuration
        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            match self.storage.database.as_mut() {
                Some(database) => database.url = url,
                None => self.storage.database = Some(DatabaseConfig::new(url)),
            }
        }
        if let Some(timeout) = lookup("DATABASE_QUERY_TIMEOUT_MS") {
            let timeout = parse_var("DATABASE_QUERY_TIMEOUT_MS", &timeout)?;
            if let Some(database) = self.storage.database.as_mut() {
                database.query_timeout_ms = timeout;
            }
        }
        if let Some(url) = lookup("REDIS_URL") {
            self.storage.redis.url = url;
        }

        // Auth configuration
        if let Some(master_key) = lookup("API_MASTER_KEY").filter(|key| !key.is_empty()) {
            self.auth.master_key = Some(master_key);
        }
        if let Some(salt) = lookup("API_KEY_HASH_SALT") {
            self.auth.hash_salt = salt;
        }

        // Rate limit configuration
        if let Some(enabled) = lookup("RATE_LIMIT_ENABLED") {
            self.rate_limit.enabled = parse_flag("RATE_LIMIT_ENABLED", &enabled)?;
        }
        if let Some(backend) = lookup("RATE_LIMIT_BACKEND") {
            self.rate_limit.backend = match backend.trim().to_ascii_lowercase().as_str() {
                "memory" => RateLimitBackend::Memory,
                "redis" => RateLimitBackend::Redis,
                other => {
                    return Err(GatewayError::Config(format!(
                        "Invalid RATE_LIMIT_BACKEND: {}",
                        other
                    )));
                }
            };
        }
        if let Some(free) = lookup("RATE_LIMIT_FREE") {
            self.rate_limit.plans.free = parse_var("RATE_LIMIT_FREE", &free)?;
        }
        if let Some(pro) = lookup("RATE_LIMIT_PRO") {
            self.rate_limit.plans.pro = parse_var("RATE_LIMIT_PRO", &pro)?;
        }
        if let Some(partner) = lookup("RATE_LIMIT_PARTNER") {
            self.rate_limit.plans.partner = parse_var("RATE_LIMIT_PARTNER", &partner)?;
        }
        if let Some(admin) = lookup("RATE_LIMIT_ADMIN") {
            self.rate_limit.plans.admin = parse_var("RATE_LIMIT_ADMIN", &admin)?;
        }

        // Logging configuration
        if let Some(json) = lookup("KEYGATE_LOG_JSON") {
            self.logging.json = parse_flag("KEYGATE_LOG_JSON", &json)?;
        }

        Ok(self)
    }
}
