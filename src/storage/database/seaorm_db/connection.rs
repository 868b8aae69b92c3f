use crate::config::DatabaseConfig;
use crate::utils::error::{GatewayError, Result};
use sea_orm::*;
use sea_orm_migration::MigratorTrait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::super::entities;
use super::super::migration::Migrator;
use super::types::{DatabaseBackendType, SeaOrmDatabase};

impl SeaOrmDatabase {
    /// Build the connection pool. File and server databases connect lazily, so
    /// a backend that is down at startup is retried by every later query.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let backend_type = DatabaseBackendType::from_url(&config.url);
        let db = Self::try_connect(config).await?;
        info!("Database pool created ({:?})", backend_type);

        Ok(Self {
            db,
            backend_type,
            query_timeout: config.query_timeout(),
            schema_ready: Arc::new(OnceCell::new()),
        })
    }

    async fn try_connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(config.url.clone());
        opt.connect_timeout(Duration::from_secs(config.connection_timeout))
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .sqlx_logging(true)
            .sqlx_logging_level(log::LevelFilter::Debug);

        // Every pooled connection to an in-memory SQLite database is a separate
        // database, so the pool is pinned to one eagerly opened connection.
        if config.url.contains(":memory:") {
            opt.min_connections(1).max_connections(1);
        } else {
            opt.max_connections(config.max_connections)
                .idle_timeout(Duration::from_secs(600))
                .max_lifetime(Duration::from_secs(3600))
                .connect_lazy(true);
        }

        Database::connect(opt).await.map_err(GatewayError::Database)
    }

    /// Get the current backend type
    pub fn backend_type(&self) -> DatabaseBackendType {
        self.backend_type
    }

    /// Run database migrations. Succeeds at most once per pool; a failed run
    /// is attempted again by the next call or query.
    pub async fn migrate(&self) -> Result<()> {
        self.schema_ready
            .get_or_try_init(|| async {
                info!("Running database migrations...");
                Migrator::up(&self.db, None).await.map_err(|e| {
                    warn!("Migration failed: {}", e);
                    GatewayError::Database(e)
                })?;
                info!("Database migrations completed successfully");
                Ok::<(), GatewayError>(())
            })
            .await?;
        Ok(())
    }

    /// Run a query under the configured timeout, migrating first if an earlier
    /// attempt could not. Elapsed timeouts surface as `GatewayError::Timeout`
    /// and the in-flight query is dropped, returning its connection to the pool.
    pub(super) async fn bounded<T, F>(&self, operation: &str, query: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, DbErr>>,
    {
        self.migrate().await?;

        match tokio::time::timeout(self.query_timeout, query).await {
            Ok(result) => result.map_err(GatewayError::Database),
            Err(_) => {
                warn!(
                    "Key store query '{}' timed out after {:?}",
                    operation, self.query_timeout
                );
                Err(GatewayError::Timeout(format!(
                    "{} exceeded {}ms",
                    operation,
                    self.query_timeout.as_millis()
                )))
            }
        }
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        debug!("Performing database health check");

        self.bounded(
            "health_check",
            entities::ApiKey::find().limit(1).all(&self.db),
        )
        .await?;

        debug!("Database health check passed");
        Ok(())
    }
}
