//! API key lifecycle management

use super::types::CreateApiKeyRequest;
use crate::core::models::{KeyRecord, KeyStatus, NewKeyRecord};
use crate::storage::KeyStore;
use crate::utils::auth::{KeyHasher, extract_api_key_prefix, generate_api_key};
use crate::utils::error::{GatewayError, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Issues and administers persisted keys
#[derive(Clone)]
pub struct ApiKeyManager {
    store: Option<Arc<dyn KeyStore>>,
    hasher: KeyHasher,
}

impl std::fmt::Debug for ApiKeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyManager")
            .field("store", &self.store.is_some())
            .finish()
    }
}

impl ApiKeyManager {
    pub fn new(store: Option<Arc<dyn KeyStore>>, hasher: KeyHasher) -> Self {
        Self { store, hasher }
    }

    fn store(&self) -> Result<&Arc<dyn KeyStore>> {
        self.store
            .as_ref()
            .ok_or_else(|| GatewayError::store_unavailable("No key store configured"))
    }

    /// Create a new API key. The raw key is returned once and never stored.
    pub async fn create_key(&self, request: CreateApiKeyRequest) -> Result<(KeyRecord, String)> {
        let store = self.store()?;

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(GatewayError::validation("Key name cannot be empty"));
        }
        if request.user_id.trim().is_empty() {
            return Err(GatewayError::validation("User id cannot be empty"));
        }
        if !request.plan.is_issuable() {
            return Err(GatewayError::forbidden(format!(
                "Plan '{}' cannot be issued to stored keys",
                request.plan
            )));
        }
        if request.expires_at.is_some_and(|expires_at| expires_at <= Utc::now()) {
            return Err(GatewayError::validation("Expiration must be in the future"));
        }

        info!("Creating API key: {}", name);

        let raw_key = generate_api_key();
        let hasher = self.hasher.clone();
        let to_hash = raw_key.clone();
        let key_hash = tokio::task::spawn_blocking(move || hasher.hash(&to_hash))
            .await
            .map_err(|e| GatewayError::Crypto(format!("Key hashing task failed: {}", e)))?;

        let record = store
            .insert_key(NewKeyRecord {
                key_hash,
                key_prefix: extract_api_key_prefix(&raw_key),
                name,
                plan: request.plan,
                user_id: request.user_id,
                expires_at: request.expires_at,
            })
            .await?;

        info!("API key created successfully: {}", record.id);
        Ok((record, raw_key))
    }

    pub async fn get_key(&self, id: i64) -> Result<Option<KeyRecord>> {
        self.store()?.find_by_id(id).await
    }

    pub async fn list_user_keys(&self, user_id: &str) -> Result<Vec<KeyRecord>> {
        debug!("Listing API keys for user {}", user_id);
        self.store()?.list_by_user(user_id).await
    }

    /// Disable a key; it stops verifying immediately
    pub async fn disable_key(&self, id: i64) -> Result<()> {
        if !self.store()?.set_status(id, KeyStatus::Disabled).await? {
            return Err(GatewayError::not_found(format!("API key {} not found", id)));
        }
        info!("API key disabled: {}", id);
        Ok(())
    }

    /// Set or clear a key's expiration
    pub async fn update_expiration(&self, id: i64, expires_at: Option<DateTime<Utc>>) -> Result<()> {
        if !self.store()?.set_expiration(id, expires_at).await? {
            return Err(GatewayError::not_found(format!("API key {} not found", id)));
        }
        info!("API key {} expiration updated", id);
        Ok(())
    }

    /// Mark every active key whose expiry has passed as expired
    pub async fn expire_stale_keys(&self) -> Result<u64> {
        let expired = self.store()?.expire_stale(Utc::now()).await?;
        if expired > 0 {
            info!("Marked {} API keys as expired", expired);
        }
        Ok(expired)
    }

    /// Run `expire_stale_keys` periodically. No-op without a store.
    pub fn start_expiry_task(self: Arc<Self>, interval: Duration) -> Option<JoinHandle<()>> {
        self.store.as_ref()?;

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = self.expire_stale_keys().await {
                    warn!("Expiry sweep failed: {}", e);
                }
            }
        }))
    }
}
