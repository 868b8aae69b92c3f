//! Test fixtures and data factories
//!
//! All factories create real objects, not mocks.

use super::TestDatabase;
use chrono::{DateTime, Utc};
use keygate::auth::{ApiKeyManager, ApiKeyVerifier, CreateApiKeyRequest, VerifierConfig};
use keygate::config::{AuthConfig, Config, RateLimitConfig};
use keygate::core::models::{KeyRecord, Plan};
use keygate::utils::auth::KeyHasher;

/// Master key used across integration tests
pub const MASTER_KEY: &str = "integration-master-key-01";

/// Hasher with a low iteration count so tests stay fast
pub fn test_hasher() -> KeyHasher {
    KeyHasher::new("integration-salt", 1_000)
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        master_key: Some(MASTER_KEY.to_string()),
        hash_salt: "integration-salt".to_string(),
        hash_iterations: 1_000,
        ..AuthConfig::default()
    }
}

pub fn verifier_config() -> VerifierConfig {
    VerifierConfig {
        hasher: test_hasher(),
        ..VerifierConfig::from(&auth_config())
    }
}

pub fn verifier(db: &TestDatabase) -> ApiKeyVerifier {
    ApiKeyVerifier::new(verifier_config(), Some(db.store()))
}

pub fn manager(db: &TestDatabase) -> ApiKeyManager {
    ApiKeyManager::new(Some(db.store()), test_hasher())
}

/// Service configuration matching the fixtures above. Built directly rather
/// than validated, since the iteration count is below the production minimum.
pub fn service_config(rate_limit: RateLimitConfig) -> Config {
    let mut config = Config::default();
    config.gateway.auth = auth_config();
    config.gateway.rate_limit = rate_limit;
    config
}

/// Factory for key creation requests
pub struct KeyRequestFactory;

impl KeyRequestFactory {
    pub fn create(plan: Plan) -> CreateApiKeyRequest {
        CreateApiKeyRequest {
            name: format!("{} test key", plan),
            plan,
            user_id: "user-42".to_string(),
            expires_at: None,
        }
    }

    pub fn for_user(plan: Plan, user_id: &str) -> CreateApiKeyRequest {
        CreateApiKeyRequest {
            user_id: user_id.to_string(),
            ..Self::create(plan)
        }
    }

    pub fn expiring(plan: Plan, expires_at: DateTime<Utc>) -> CreateApiKeyRequest {
        CreateApiKeyRequest {
            expires_at: Some(expires_at),
            ..Self::create(plan)
        }
    }
}

/// Issue a key through the manager, returning the record and raw key
pub async fn issue_key(db: &TestDatabase, plan: Plan) -> (KeyRecord, String) {
    manager(db)
        .create_key(KeyRequestFactory::create(plan))
        .await
        .expect("Failed to create test key")
}
