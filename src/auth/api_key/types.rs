//! API key verification types and request payloads

use crate::config::{AuthConfig, LegacyKeyConfig};
use crate::core::models::{KeyInfo, Plan};
use crate::utils::auth::KeyHasher;
use crate::utils::error::GatewayError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Immutable credential configuration injected into the verifier
#[derive(Clone, Default)]
pub struct VerifierConfig {
    /// Process-wide admin credential
    pub master_key: Option<String>,
    /// Static credential table
    pub legacy_keys: BTreeMap<String, LegacyKeyConfig>,
    /// Digest parameters for persisted keys
    pub hasher: KeyHasher,
}

impl From<&AuthConfig> for VerifierConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            master_key: config.master_key.clone(),
            legacy_keys: config.legacy_keys.clone(),
            hasher: KeyHasher::new(config.hash_salt.clone(), config.hash_iterations),
        }
    }
}

impl fmt::Debug for VerifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifierConfig")
            .field("master_key", &self.master_key.as_ref().map(|_| "<redacted>"))
            .field("legacy_keys", &self.legacy_keys.len())
            .field("hash_iterations", &self.hasher.iterations())
            .finish()
    }
}

/// Why a credential was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// Blank credential, nothing was consulted
    Empty,
    /// No source knows the credential
    NotFound,
    /// Matched a record that is not active
    Disabled,
    /// Matched a record whose expiry has passed
    Expired,
    /// The key store failed and no other source matched
    StoreUnavailable,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::Empty => "empty credential",
            Rejection::NotFound => "unknown credential",
            Rejection::Disabled => "key is not active",
            Rejection::Expired => "key has expired",
            Rejection::StoreUnavailable => "key store unavailable",
        };
        f.write_str(reason)
    }
}

/// Answer from a single credential source
#[derive(Debug)]
pub enum Resolution {
    /// The source owns the credential and it is usable
    Resolved(KeyInfo),
    /// The source owns the credential but refuses it
    Rejected(Rejection),
    /// The source does not know the credential
    Unmatched,
    /// The source could not answer
    Failed(GatewayError),
}

/// API key creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateApiKeyRequest {
    /// Key name/description
    pub name: String,
    /// Plan bound to the key
    pub plan: Plan,
    /// Owning user reference
    pub user_id: String,
    /// Expiration date
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}
