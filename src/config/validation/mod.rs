//! Configuration validation
//!
//! One `Validate` implementation per configuration section:
//! - `config_validators`: `GatewayConfig` and `ServerConfig`
//! - `storage_validators`: database and Redis settings
//! - `auth_validators`: master key, legacy table and hashing parameters
//! - `rate_limit_validators`: windows and plan quotas

mod auth_validators;
mod config_validators;
mod rate_limit_validators;
mod storage_validators;
mod trait_def;

pub use trait_def::Validate;

/// Smallest accepted PBKDF2 round count
pub const MIN_HASH_ITERATIONS: u32 = 10_000;

/// Smallest accepted master key length
pub const MIN_MASTER_KEY_LEN: usize = 16;
