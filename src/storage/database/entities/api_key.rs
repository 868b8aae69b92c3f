use crate::core::models::{KeyRecord, KeyStatus, Plan};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// API key database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "api_keys")]
pub struct Model {
    /// Key ID
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Salted PBKDF2 digest of the raw key
    #[sea_orm(unique)]
    pub key_hash: String,

    /// Leading characters of the raw key, used to narrow lookups
    pub key_prefix: String,

    /// Human-readable label
    pub name: String,

    /// Plan name (free, pro, partner)
    pub plan: String,

    /// Status (active, disabled, expired)
    pub status: String,

    /// Owning user reference
    pub user_id: String,

    /// Expiration timestamp, none for non-expiring keys
    pub expires_at: Option<DateTimeUtc>,

    /// Successful verifications
    pub request_count: i64,

    /// Throttled requests
    pub rate_limit_hits: i64,

    /// Creation timestamp
    pub created_at: DateTimeUtc,

    /// Last successful verification
    pub last_used_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain record; fails on unknown plan or status values
    pub fn to_record(&self) -> crate::utils::error::Result<KeyRecord> {
        let plan: Plan = self.plan.parse()?;
        let status: KeyStatus = self.status.parse()?;

        Ok(KeyRecord {
            id: i64::from(self.id),
            key_hash: self.key_hash.clone(),
            key_prefix: self.key_prefix.clone(),
            name: self.name.clone(),
            plan,
            status,
            user_id: self.user_id.clone(),
            expires_at: self.expires_at,
            request_count: self.request_count,
            rate_limit_hits: self.rate_limit_hits,
            created_at: self.created_at,
            last_used_at: self.last_used_at,
        })
    }
}
