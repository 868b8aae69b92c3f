//! Credential sources consulted by the verifier, in priority order

use super::types::{Rejection, Resolution};
use crate::config::LegacyKeyConfig;
use crate::core::models::{KeyInfo, KeyStatus};
use crate::storage::KeyStore;
use crate::utils::auth::crypto::constant_time_eq;
use crate::utils::auth::{KeyHasher, extract_api_key_prefix};
use crate::utils::error::GatewayError;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A single source of credentials
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn resolve(&self, credential: &str) -> Resolution;
}

/// Matches the configured master credential
pub struct MasterKeyResolver {
    master_key: Option<String>,
}

impl MasterKeyResolver {
    pub fn new(master_key: Option<String>) -> Self {
        Self { master_key }
    }
}

#[async_trait]
impl KeyResolver for MasterKeyResolver {
    fn name(&self) -> &'static str {
        "master"
    }

    async fn resolve(&self, credential: &str) -> Resolution {
        match &self.master_key {
            Some(master) if constant_time_eq(master, credential) => {
                Resolution::Resolved(KeyInfo::master())
            }
            _ => Resolution::Unmatched,
        }
    }
}

/// Matches the static legacy table
pub struct LegacyKeyResolver {
    keys: BTreeMap<String, LegacyKeyConfig>,
}

impl LegacyKeyResolver {
    pub fn new(keys: BTreeMap<String, LegacyKeyConfig>) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl KeyResolver for LegacyKeyResolver {
    fn name(&self) -> &'static str {
        "legacy"
    }

    async fn resolve(&self, credential: &str) -> Resolution {
        match self.keys.get(credential) {
            Some(legacy) => Resolution::Resolved(KeyInfo::legacy(legacy.name.clone(), legacy.plan)),
            None => Resolution::Unmatched,
        }
    }
}

/// Prefix lookup followed by digest comparison against the persisted store
pub struct StoreKeyResolver {
    store: Arc<dyn KeyStore>,
    hasher: KeyHasher,
}

impl StoreKeyResolver {
    pub fn new(store: Arc<dyn KeyStore>, hasher: KeyHasher) -> Self {
        Self { store, hasher }
    }
}

#[async_trait]
impl KeyResolver for StoreKeyResolver {
    fn name(&self) -> &'static str {
        "store"
    }

    async fn resolve(&self, credential: &str) -> Resolution {
        let prefix = extract_api_key_prefix(credential);

        let candidates = match self.store.find_by_prefix(&prefix).await {
            Ok(candidates) => candidates,
            Err(e) => return Resolution::Failed(e),
        };

        if candidates.is_empty() {
            debug!("No stored keys share prefix");
            return Resolution::Unmatched;
        }

        // PBKDF2 is deliberately slow; keep it off the async workers
        let hasher = self.hasher.clone();
        let raw = credential.to_string();
        let digest = match tokio::task::spawn_blocking(move || hasher.hash(&raw)).await {
            Ok(digest) => digest,
            Err(e) => {
                return Resolution::Failed(GatewayError::Crypto(format!(
                    "Key hashing task failed: {}",
                    e
                )));
            }
        };

        let Some(record) = candidates
            .into_iter()
            .find(|candidate| constant_time_eq(&candidate.key_hash, &digest))
        else {
            debug!("Prefix matched but no digest did");
            return Resolution::Unmatched;
        };

        match record.status {
            KeyStatus::Active => {}
            KeyStatus::Disabled => return Resolution::Rejected(Rejection::Disabled),
            KeyStatus::Expired => return Resolution::Rejected(Rejection::Expired),
        }

        if record.is_expired_at(Utc::now()) {
            return Resolution::Rejected(Rejection::Expired);
        }

        // Usage metering never blocks a valid key
        if let Err(e) = self.store.increment_request_count(record.id).await {
            warn!("Failed to record usage for key {}: {}", record.id, e);
        }

        Resolution::Resolved(KeyInfo::from(&record))
    }
}
