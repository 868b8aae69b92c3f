//! Application state shared across HTTP handlers

use crate::auth::{ApiKeyManager, ApiKeyVerifier, VerifierConfig};
use crate::config::Config;
use crate::core::AccessGate;
use crate::core::rate_limiter::RateLimiter;
use crate::storage::StorageLayer;
use crate::utils::auth::KeyHasher;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// Everything is behind `Arc` so cloning per worker is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration (shared read-only)
    pub config: Arc<Config>,
    /// Verification followed by rate limiting
    pub gate: AccessGate,
    /// Key lifecycle operations against the store
    pub manager: Arc<ApiKeyManager>,
    /// Storage layer
    pub storage: Arc<StorageLayer>,
}

impl AppState {
    /// Wire the verifier, limiter and key manager over an initialized storage layer
    pub fn new(config: Config, storage: StorageLayer, limiter: RateLimiter) -> Self {
        let auth = config.auth();
        let store = storage.key_store();
        let hasher = KeyHasher::new(auth.hash_salt.clone(), auth.hash_iterations);

        let verifier = ApiKeyVerifier::new(VerifierConfig::from(auth), store.clone());
        let manager = ApiKeyManager::new(store, hasher);

        Self {
            gate: AccessGate::new(Arc::new(verifier), Arc::new(limiter)),
            manager: Arc::new(manager),
            storage: Arc::new(storage),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn verifier(&self) -> &Arc<ApiKeyVerifier> {
        self.gate.verifier()
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        self.gate.limiter()
    }
}
