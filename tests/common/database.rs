//! Test database utilities
//!
//! Each test gets an isolated, migrated in-memory SQLite database.

use keygate::config::DatabaseConfig;
use keygate::storage::database::Database;
use keygate::storage::{KeyStore, StorageLayer};
use std::path::Path;
use std::sync::Arc;

/// Test database wrapper providing isolated in-memory SQLite instances
#[derive(Debug, Clone)]
pub struct TestDatabase {
    inner: Arc<Database>,
}

impl TestDatabase {
    /// Create and migrate a fresh in-memory database
    pub async fn new() -> Self {
        let db = Database::new(&test_db_config())
            .await
            .expect("Failed to create in-memory test database");

        db.migrate()
            .await
            .expect("Failed to run database migrations");

        Self {
            inner: Arc::new(db),
        }
    }

    /// Get reference to the underlying database
    pub fn db(&self) -> &Database {
        &self.inner
    }

    /// The database as the verifier sees it
    pub fn store(&self) -> Arc<dyn KeyStore> {
        Arc::clone(&self.inner) as Arc<dyn KeyStore>
    }

    pub fn storage_layer(&self) -> StorageLayer {
        StorageLayer::with_database(Arc::clone(&self.inner))
    }
}

/// In-memory SQLite config; a single connection so every query sees the same database
pub fn test_db_config() -> DatabaseConfig {
    DatabaseConfig {
        max_connections: 1,
        ..DatabaseConfig::new("sqlite::memory:")
    }
}

/// File-backed SQLite config with a real connection pool
pub fn file_db_config(path: &Path, max_connections: u32) -> DatabaseConfig {
    DatabaseConfig {
        max_connections,
        connection_timeout: 2,
        ..DatabaseConfig::new(format!("sqlite://{}?mode=rwc", path.display()))
    }
}
