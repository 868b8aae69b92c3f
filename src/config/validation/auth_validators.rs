//! Authentication configuration validators

use super::trait_def::Validate;
use super::{MIN_HASH_ITERATIONS, MIN_MASTER_KEY_LEN};
use crate::config::models::*;
use crate::core::models::Plan;
use tracing::debug;

impl Validate for AuthConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating auth configuration");

        if let Some(master_key) = &self.master_key {
            if master_key.chars().count() < MIN_MASTER_KEY_LEN {
                return Err(format!(
                    "Master key should be at least {} characters long",
                    MIN_MASTER_KEY_LEN
                ));
            }
            if self.legacy_keys.contains_key(master_key) {
                return Err("Master key cannot also be a legacy key".to_string());
            }
        }

        for (key, legacy) in &self.legacy_keys {
            if key.trim().is_empty() {
                return Err("Legacy key cannot be empty".to_string());
            }
            if legacy.plan == Plan::Admin {
                return Err(format!(
                    "Legacy key '{}' cannot be bound to the admin plan",
                    legacy.name
                ));
            }
        }

        if self.api_key_header.trim().is_empty() {
            return Err("API key header cannot be empty".to_string());
        }

        if self.hash_salt.is_empty() {
            return Err("API key hash salt cannot be empty".to_string());
        }

        if self.hash_iterations < MIN_HASH_ITERATIONS {
            return Err(format!(
                "API key hash iterations must be at least {}",
                MIN_HASH_ITERATIONS
            ));
        }

        Ok(())
    }
}
