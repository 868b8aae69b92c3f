use crate::core::models::{KeyRecord, KeyStatus, NewKeyRecord};
use crate::storage::key_store::KeyStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::{debug, warn};

use super::super::entities::{self, api_key};
use super::types::SeaOrmDatabase;

/// Decode rows, skipping (and reporting) any with unknown plan or status values
fn decode_rows(models: Vec<api_key::Model>) -> Vec<KeyRecord> {
    models
        .into_iter()
        .filter_map(|model| match model.to_record() {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping undecodable api key row {}: {}", model.id, e);
                None
            }
        })
        .collect()
}

/// Record ids are stored as 32-bit integers; anything outside that range cannot exist
fn row_id(id: i64) -> Option<i32> {
    i32::try_from(id).ok()
}

impl SeaOrmDatabase {
    async fn update_status_where(&self, id: i32, status: KeyStatus) -> Result<bool> {
        let result = self
            .bounded(
                "set_status",
                entities::ApiKey::update_many()
                    .col_expr(api_key::Column::Status, Expr::value(status.as_str()))
                    .filter(api_key::Column::Id.eq(id))
                    .exec(&self.db),
            )
            .await?;
        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl KeyStore for SeaOrmDatabase {
    async fn find_by_prefix(&self, prefix: &str) -> Result<Vec<KeyRecord>> {
        debug!("Finding api keys by prefix");

        let models = self
            .bounded(
                "find_by_prefix",
                entities::ApiKey::find()
                    .filter(api_key::Column::KeyPrefix.eq(prefix))
                    .order_by_asc(api_key::Column::Id)
                    .all(&self.db),
            )
            .await?;

        Ok(decode_rows(models))
    }

    async fn increment_request_count(&self, id: i64) -> Result<bool> {
        let Some(id) = row_id(id) else {
            return Ok(false);
        };

        let result = self
            .bounded(
                "increment_request_count",
                entities::ApiKey::update_many()
                    .col_expr(
                        api_key::Column::RequestCount,
                        Expr::col(api_key::Column::RequestCount).add(1),
                    )
                    .col_expr(api_key::Column::LastUsedAt, Expr::value(Utc::now()))
                    .filter(api_key::Column::Id.eq(id))
                    .exec(&self.db),
            )
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn increment_rate_limit_hits_by_prefix(&self, prefix: &str) -> Result<bool> {
        let first: Option<i32> = self
            .bounded(
                "find_first_by_prefix",
                entities::ApiKey::find()
                    .select_only()
                    .column(api_key::Column::Id)
                    .filter(api_key::Column::KeyPrefix.eq(prefix))
                    .order_by_asc(api_key::Column::Id)
                    .into_tuple::<i32>()
                    .one(&self.db),
            )
            .await?;

        let Some(id) = first else {
            return Ok(false);
        };

        let result = self
            .bounded(
                "increment_rate_limit_hits",
                entities::ApiKey::update_many()
                    .col_expr(
                        api_key::Column::RateLimitHits,
                        Expr::col(api_key::Column::RateLimitHits).add(1),
                    )
                    .filter(api_key::Column::Id.eq(id))
                    .exec(&self.db),
            )
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn insert_key(&self, key: NewKeyRecord) -> Result<KeyRecord> {
        debug!("Inserting api key '{}' for user {}", key.name, key.user_id);

        let active_model = api_key::ActiveModel {
            key_hash: Set(key.key_hash),
            key_prefix: Set(key.key_prefix),
            name: Set(key.name),
            plan: Set(key.plan.as_str().to_string()),
            status: Set(KeyStatus::Active.as_str().to_string()),
            user_id: Set(key.user_id),
            expires_at: Set(key.expires_at),
            request_count: Set(0),
            rate_limit_hits: Set(0),
            created_at: Set(Utc::now()),
            last_used_at: Set(None),
            ..Default::default()
        };

        let model = self
            .bounded("insert_key", active_model.insert(&self.db))
            .await?;

        model.to_record()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<KeyRecord>> {
        let Some(id) = row_id(id) else {
            return Ok(None);
        };

        let model = self
            .bounded("find_by_id", entities::ApiKey::find_by_id(id).one(&self.db))
            .await?;

        model.map(|model| model.to_record()).transpose()
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<KeyRecord>> {
        let models = self
            .bounded(
                "list_by_user",
                entities::ApiKey::find()
                    .filter(api_key::Column::UserId.eq(user_id))
                    .order_by_asc(api_key::Column::Id)
                    .all(&self.db),
            )
            .await?;

        Ok(decode_rows(models))
    }

    async fn set_status(&self, id: i64, status: KeyStatus) -> Result<bool> {
        match row_id(id) {
            Some(id) => self.update_status_where(id, status).await,
            None => Ok(false),
        }
    }

    async fn set_expiration(&self, id: i64, expires_at: Option<DateTime<Utc>>) -> Result<bool> {
        let Some(id) = row_id(id) else {
            return Ok(false);
        };

        let result = self
            .bounded(
                "set_expiration",
                entities::ApiKey::update_many()
                    .col_expr(api_key::Column::ExpiresAt, Expr::value(expires_at))
                    .filter(api_key::Column::Id.eq(id))
                    .exec(&self.db),
            )
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn expire_stale(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = self
            .bounded(
                "expire_stale",
                entities::ApiKey::update_many()
                    .col_expr(
                        api_key::Column::Status,
                        Expr::value(KeyStatus::Expired.as_str()),
                    )
                    .filter(api_key::Column::Status.eq(KeyStatus::Active.as_str()))
                    .filter(api_key::Column::ExpiresAt.is_not_null())
                    .filter(api_key::Column::ExpiresAt.lt(now))
                    .exec(&self.db),
            )
            .await?;

        Ok(result.rows_affected)
    }

    async fn health_check(&self) -> Result<()> {
        SeaOrmDatabase::health_check(self).await
    }
}

