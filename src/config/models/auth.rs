//! Authentication configuration

use super::*;
use crate::core::models::Plan;
use crate::utils::auth::mask_api_key;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Credential sources and hashing parameters
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Process-wide credential granting the admin plan
    #[serde(default)]
    pub master_key: Option<String>,
    /// Static credentials kept for backward compatibility
    #[serde(default = "default_legacy_keys")]
    pub legacy_keys: BTreeMap<String, LegacyKeyConfig>,
    /// Header carrying the API key
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
    /// Salt applied to every stored key digest
    #[serde(default = "default_hash_salt")]
    pub hash_salt: String,
    /// PBKDF2 rounds
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
}

/// Plan and label bound to a legacy credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyKeyConfig {
    pub plan: Plan,
    pub name: String,
}

impl LegacyKeyConfig {
    pub fn new(plan: Plan, name: impl Into<String>) -> Self {
        Self {
            plan,
            name: name.into(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            master_key: None,
            legacy_keys: default_legacy_keys(),
            api_key_header: default_api_key_header(),
            hash_salt: default_hash_salt(),
            hash_iterations: default_hash_iterations(),
        }
    }
}

// Credentials are masked so the config can be logged
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let legacy: Vec<String> = self.legacy_keys.keys().map(|k| mask_api_key(k)).collect();
        f.debug_struct("AuthConfig")
            .field("master_key", &self.master_key.as_ref().map(|_| "<redacted>"))
            .field("legacy_keys", &legacy)
            .field("api_key_header", &self.api_key_header)
            .field("hash_salt", &"<redacted>")
            .field("hash_iterations", &self.hash_iterations)
            .finish()
    }
}

/// Legacy credentials recognized without a database
pub fn default_legacy_keys() -> BTreeMap<String, LegacyKeyConfig> {
    BTreeMap::from([
        (
            "freekey123".to_string(),
            LegacyKeyConfig::new(Plan::Free, "Free Legacy Key"),
        ),
        (
            "prokey456".to_string(),
            LegacyKeyConfig::new(Plan::Pro, "Pro Legacy Key"),
        ),
        (
            "partnerkey789".to_string(),
            LegacyKeyConfig::new(Plan::Partner, "Partner Legacy Key"),
        ),
    ])
}

/// Warn about settings that are acceptable in development only
pub fn warn_insecure_config(config: &AuthConfig) {
    if config.master_key.is_none() {
        warn!("No master key configured; admin routes are unreachable");
    }
    if !config.legacy_keys.is_empty() && config.legacy_keys == default_legacy_keys() {
        warn!("Built-in legacy keys are enabled; disable them once clients have migrated");
    }
    if config.hash_salt == default_hash_salt() {
        warn!("API key hash salt is the built-in default; set API_KEY_HASH_SALT in production");
    }
}
