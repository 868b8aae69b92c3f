//! Persisted key store abstraction
//!
//! The verifier and key management talk to storage only through [`KeyStore`],
//! so the database can be swapped for a mock in tests.

use crate::core::models::{KeyRecord, KeyStatus, NewKeyRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Operations the service needs from the persisted key table
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// All records sharing a lookup prefix. Rows that cannot be decoded are skipped.
    async fn find_by_prefix(&self, prefix: &str) -> Result<Vec<KeyRecord>>;

    /// Atomically bump the usage counter and stamp `last_used_at`
    async fn increment_request_count(&self, id: i64) -> Result<bool>;

    /// Atomically bump the throttle counter of the first record with `prefix`
    async fn increment_rate_limit_hits_by_prefix(&self, prefix: &str) -> Result<bool>;

    async fn insert_key(&self, key: NewKeyRecord) -> Result<KeyRecord>;

    async fn find_by_id(&self, id: i64) -> Result<Option<KeyRecord>>;

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<KeyRecord>>;

    /// Returns false when no record has this id
    async fn set_status(&self, id: i64, status: KeyStatus) -> Result<bool>;

    async fn set_expiration(&self, id: i64, expires_at: Option<DateTime<Utc>>) -> Result<bool>;

    /// Mark active keys whose expiry has passed as expired
    async fn expire_stale(&self, now: DateTime<Utc>) -> Result<u64>;

    async fn health_check(&self) -> Result<()>;
}
