//! Storage layer
//!
//! Owns the optional key store database. Without one, or while it is
//! unreachable, the service runs with master and legacy credentials only.

/// Database storage module
pub mod database;
/// Key store abstraction
pub mod key_store;

pub use key_store::KeyStore;

use crate::config::StorageConfig;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Storage backends available to the service
#[derive(Debug, Clone, Default)]
pub struct StorageLayer {
    /// Key store database, absent when not configured
    pub database: Option<Arc<database::Database>>,
}

/// Result of probing the storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StorageHealthStatus {
    /// Whether a database is configured at all
    pub database_configured: bool,
    /// Whether the configured database answered
    pub database: bool,
    /// Overall storage health
    pub overall: bool,
}

impl StorageLayer {
    /// Open the configured database and try to migrate it. A backend that is
    /// down at startup stays attached: each key store call retries it and only
    /// that call falls back.
    pub async fn new(config: &StorageConfig) -> Self {
        let Some(db_config) = &config.database else {
            info!("No database configured; only master and legacy keys will verify");
            return Self::default();
        };

        let database = match database::Database::new(db_config).await {
            Ok(database) => database,
            Err(e) => {
                warn!("Invalid key store configuration, continuing without it: {}", e);
                return Self::default();
            }
        };

        match database.migrate().await {
            Ok(()) => info!("Storage layer initialized successfully"),
            Err(e) => warn!("Key store not ready, will retry on use: {}", e),
        }

        Self::with_database(Arc::new(database))
    }

    pub fn with_database(database: Arc<database::Database>) -> Self {
        Self {
            database: Some(database),
        }
    }

    /// The key store view of the database, if any
    pub fn key_store(&self) -> Option<Arc<dyn KeyStore>> {
        self.database
            .clone()
            .map(|database| database as Arc<dyn KeyStore>)
    }

    /// Health check for all storage backends
    pub async fn health_check(&self) -> StorageHealthStatus {
        let Some(database) = &self.database else {
            return StorageHealthStatus {
                database_configured: false,
                database: false,
                overall: true,
            };
        };

        let healthy = match database.health_check().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Database health check failed: {}", e);
                false
            }
        };

        StorageHealthStatus {
            database_configured: true,
            database: healthy,
            overall: healthy,
        }
    }
}
