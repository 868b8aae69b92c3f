//! API key verification
//!
//! Walks the resolver chain (master, legacy, store) and collapses the outcome
//! to a boolean at the public boundary. Store failures are logged and never
//! surface to the caller.

use super::resolver::{KeyResolver, LegacyKeyResolver, MasterKeyResolver, StoreKeyResolver};
use super::types::{Rejection, Resolution, VerifierConfig};
use crate::core::models::KeyInfo;
use crate::storage::KeyStore;
use crate::utils::auth::{extract_api_key_prefix, mask_api_key};
use std::sync::Arc;
use tracing::{debug, warn};

/// Verifies presented credentials and meters their use
#[derive(Clone)]
pub struct ApiKeyVerifier {
    resolvers: Vec<Arc<dyn KeyResolver>>,
    store: Option<Arc<dyn KeyStore>>,
}

impl std::fmt::Debug for ApiKeyVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.resolvers.iter().map(|r| r.name()).collect();
        f.debug_struct("ApiKeyVerifier")
            .field("resolvers", &names)
            .field("store", &self.store.is_some())
            .finish()
    }
}

impl ApiKeyVerifier {
    /// Build the standard chain. Without a store only master and legacy
    /// credentials can verify.
    pub fn new(config: VerifierConfig, store: Option<Arc<dyn KeyStore>>) -> Self {
        let mut resolvers: Vec<Arc<dyn KeyResolver>> = vec![
            Arc::new(MasterKeyResolver::new(config.master_key)),
            Arc::new(LegacyKeyResolver::new(config.legacy_keys)),
        ];

        if let Some(store) = &store {
            resolvers.push(Arc::new(StoreKeyResolver::new(
                Arc::clone(store),
                config.hasher,
            )));
        }

        Self::with_resolvers(resolvers, store)
    }

    /// Use a custom resolver chain, consulted in order
    pub fn with_resolvers(
        resolvers: Vec<Arc<dyn KeyResolver>>,
        store: Option<Arc<dyn KeyStore>>,
    ) -> Self {
        Self { resolvers, store }
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// Verify a credential, keeping the rejection reason
    pub async fn verify_detailed(&self, raw_key: &str) -> Result<KeyInfo, Rejection> {
        if raw_key.trim().is_empty() {
            return Err(Rejection::Empty);
        }

        let mut source_failed = false;
        for resolver in &self.resolvers {
            match resolver.resolve(raw_key).await {
                Resolution::Resolved(info) => {
                    debug!(
                        resolver = resolver.name(),
                        plan = %info.plan,
                        "API key verified"
                    );
                    return Ok(info);
                }
                Resolution::Rejected(reason) => {
                    debug!(
                        resolver = resolver.name(),
                        key = %mask_api_key(raw_key),
                        %reason,
                        "API key rejected"
                    );
                    return Err(reason);
                }
                Resolution::Unmatched => {}
                Resolution::Failed(e) => {
                    warn!(
                        resolver = resolver.name(),
                        key = %mask_api_key(raw_key),
                        error = %e,
                        "Key source failed, falling back"
                    );
                    source_failed = true;
                }
            }
        }

        if source_failed {
            Err(Rejection::StoreUnavailable)
        } else {
            Err(Rejection::NotFound)
        }
    }

    /// Verify a credential: `(true, Some(info))` when usable, `(false, None)` otherwise
    pub async fn verify(&self, raw_key: &str) -> (bool, Option<KeyInfo>) {
        match self.verify_detailed(raw_key).await {
            Ok(info) => (true, Some(info)),
            Err(_) => (false, None),
        }
    }

    /// Count a throttled request against the first stored key sharing the
    /// credential's prefix. Returns whether a record was updated.
    pub async fn record_rate_limit_hit(&self, raw_key: &str) -> bool {
        let Some(store) = &self.store else {
            return false;
        };

        let prefix = extract_api_key_prefix(raw_key);
        match store.increment_rate_limit_hits_by_prefix(&prefix).await {
            Ok(updated) => updated,
            Err(e) => {
                warn!(
                    key = %mask_api_key(raw_key),
                    error = %e,
                    "Failed to record rate limit hit"
                );
                false
            }
        }
    }
}
