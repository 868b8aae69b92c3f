//! Verifier and key management over a real key store

#[cfg(test)]
mod tests {
    use crate::common::TestDatabase;
    use crate::common::database::file_db_config;
    use crate::common::fixtures::{
        KeyRequestFactory, MASTER_KEY, issue_key, manager, test_hasher, verifier,
        verifier_config,
    };
    use crate::{assert_err, assert_ok};
    use chrono::{Duration, Utc};
    use keygate::auth::{ApiKeyManager, ApiKeyVerifier, Rejection};
    use keygate::config::StorageConfig;
    use keygate::core::models::{KeySource, KeyStatus, Plan};
    use keygate::storage::StorageLayer;
    use std::sync::Arc;
    use keygate::utils::auth::extract_api_key_prefix;
    use keygate::utils::error::GatewayError;

    #[tokio::test]
    async fn test_issued_key_verifies_with_its_plan() {
        let db = TestDatabase::new().await;
        let (record, raw_key) = issue_key(&db, Plan::Pro).await;

        let (valid, info) = verifier(&db).verify(&raw_key).await;

        assert!(valid);
        let info = info.unwrap();
        assert_eq!(info.id, Some(record.id));
        assert_eq!(info.plan, Plan::Pro);
        assert_eq!(info.status, KeyStatus::Active);
        assert_eq!(info.user_id, "user-42");
        assert_eq!(info.source, KeySource::Store);
    }

    #[tokio::test]
    async fn test_each_verification_counts_exactly_once() {
        let db = TestDatabase::new().await;
        let (record, raw_key) = issue_key(&db, Plan::Free).await;
        let verifier = verifier(&db);

        for expected in 1..=3 {
            assert!(verifier.verify(&raw_key).await.0);
            let stored = db.store().find_by_id(record.id).await.unwrap().unwrap();
            assert_eq!(stored.request_count, expected);
        }
    }

    #[tokio::test]
    async fn test_raw_key_is_not_stored() {
        let db = TestDatabase::new().await;
        let (record, raw_key) = issue_key(&db, Plan::Free).await;

        assert_ne!(record.key_hash, raw_key);
        assert_eq!(record.key_hash.len(), 64);
        assert_eq!(record.key_prefix, extract_api_key_prefix(&raw_key));
    }

    #[tokio::test]
    async fn test_wrong_key_with_shared_prefix_is_rejected() {
        let db = TestDatabase::new().await;
        let (record, raw_key) = issue_key(&db, Plan::Free).await;

        let mut forged = raw_key.clone();
        forged.pop();
        forged.push(if raw_key.ends_with('A') { 'B' } else { 'A' });

        let verifier = verifier(&db);
        assert_eq!(verifier.verify(&forged).await, (false, None));
        assert_eq!(
            verifier.verify_detailed(&forged).await,
            Err(Rejection::NotFound)
        );

        let stored = db.store().find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(stored.request_count, 0);
    }

    #[tokio::test]
    async fn test_disabled_key_never_verifies() {
        let db = TestDatabase::new().await;
        let (record, raw_key) = issue_key(&db, Plan::Partner).await;
        let verifier = verifier(&db);
        assert!(verifier.verify(&raw_key).await.0);

        assert_ok!(manager(&db).disable_key(record.id).await);

        assert_eq!(verifier.verify(&raw_key).await, (false, None));
        assert_eq!(
            verifier.verify_detailed(&raw_key).await,
            Err(Rejection::Disabled)
        );
    }

    #[tokio::test]
    async fn test_expired_key_never_verifies() {
        let db = TestDatabase::new().await;
        let (record, raw_key) = issue_key(&db, Plan::Pro).await;
        let manager = manager(&db);

        assert_ok!(
            manager
                .update_expiration(record.id, Some(Utc::now() - Duration::seconds(1)))
                .await
        );

        let verifier = verifier(&db);
        assert_eq!(verifier.verify(&raw_key).await, (false, None));
        assert_eq!(
            verifier.verify_detailed(&raw_key).await,
            Err(Rejection::Expired)
        );

        // Clearing the expiry restores it
        assert_ok!(manager.update_expiration(record.id, None).await);
        assert!(verifier.verify(&raw_key).await.0);
    }

    #[tokio::test]
    async fn test_future_expiry_still_verifies() {
        let db = TestDatabase::new().await;
        let (_, raw_key) = manager(&db)
            .create_key(KeyRequestFactory::expiring(
                Plan::Free,
                Utc::now() + Duration::days(30),
            ))
            .await
            .unwrap();

        assert!(verifier(&db).verify(&raw_key).await.0);
    }

    #[tokio::test]
    async fn test_expire_stale_keys_marks_status() {
        let db = TestDatabase::new().await;
        let (record, _) = issue_key(&db, Plan::Free).await;
        let manager = manager(&db);

        assert_ok!(
            manager
                .update_expiration(record.id, Some(Utc::now() - Duration::minutes(5)))
                .await
        );
        assert_eq!(assert_ok!(manager.expire_stale_keys().await), 1);

        let stored = assert_ok!(manager.get_key(record.id).await).unwrap();
        assert_eq!(stored.status, KeyStatus::Expired);
    }

    #[tokio::test]
    async fn test_static_credentials_bypass_the_store() {
        let db = TestDatabase::new().await;
        let verifier = verifier(&db);

        let (valid, info) = verifier.verify(MASTER_KEY).await;
        assert!(valid);
        let info = info.unwrap();
        assert_eq!(info.plan, Plan::Admin);
        assert_eq!(info.user_id, "admin");
        assert_eq!(info.name, "Master Key");

        let (valid, info) = verifier.verify("freekey123").await;
        assert!(valid);
        let info = info.unwrap();
        assert_eq!(info.plan, Plan::Free);
        assert_eq!(info.user_id, "legacy");
        assert!(info.id.is_none());
    }

    #[tokio::test]
    async fn test_without_store_only_static_credentials_verify() {
        let verifier = ApiKeyVerifier::new(verifier_config(), None);

        assert!(verifier.verify(MASTER_KEY).await.0);
        assert!(verifier.verify("prokey456").await.0);
        assert_eq!(verifier.verify("kg_notstoredanywhere").await, (false, None));
        assert_eq!(verifier.verify("").await, (false, None));
        assert!(!verifier.record_rate_limit_hit("kg_notstoredanywhere").await);
    }

    #[tokio::test]
    async fn test_record_rate_limit_hit_updates_stored_key() {
        let db = TestDatabase::new().await;
        let (record, raw_key) = issue_key(&db, Plan::Free).await;
        let verifier = verifier(&db);

        assert!(verifier.record_rate_limit_hit(&raw_key).await);
        assert!(verifier.record_rate_limit_hit(&raw_key).await);
        assert!(!verifier.record_rate_limit_hit("freekey123").await);

        let stored = db.store().find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(stored.rate_limit_hits, 2);
        assert_eq!(stored.request_count, 0);
    }

    #[tokio::test]
    async fn test_admin_plan_cannot_be_issued() {
        let db = TestDatabase::new().await;

        let err = assert_err!(
            manager(&db)
                .create_key(KeyRequestFactory::create(Plan::Admin))
                .await
        );
        assert!(matches!(err, GatewayError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_list_user_keys() {
        let db = TestDatabase::new().await;
        let manager = manager(&db);

        for plan in [Plan::Free, Plan::Pro] {
            assert_ok!(
                manager
                    .create_key(KeyRequestFactory::for_user(plan, "alice"))
                    .await
            );
        }
        assert_ok!(
            manager
                .create_key(KeyRequestFactory::for_user(Plan::Free, "bob"))
                .await
        );

        let keys = assert_ok!(manager.list_user_keys("alice").await);
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().all(|k| k.user_id == "alice"));
    }

    #[tokio::test]
    async fn test_disable_unknown_key_is_not_found() {
        let db = TestDatabase::new().await;

        let err = assert_err!(manager(&db).disable_key(12_345).await);
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_store_down_at_boot_recovers_without_restart() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let config = StorageConfig {
            database: Some(file_db_config(&data_dir.join("keys.db"), 2)),
            ..StorageConfig::default()
        };

        // The parent directory does not exist yet, so nothing can be opened
        let storage = StorageLayer::new(&config).await;
        let store = storage.key_store().expect("configured store stays attached");
        let verifier = ApiKeyVerifier::new(verifier_config(), Some(Arc::clone(&store)));

        assert!(verifier.has_store());
        assert!(!storage.health_check().await.database);
        assert!(!verifier.verify("kg_issued-while-down").await.0);
        assert!(verifier.verify(MASTER_KEY).await.0);

        std::fs::create_dir_all(&data_dir).unwrap();

        let manager = ApiKeyManager::new(Some(Arc::clone(&store)), test_hasher());
        let (record, raw_key) = assert_ok!(
            manager
                .create_key(KeyRequestFactory::create(Plan::Partner))
                .await
        );

        let (valid, info) = verifier.verify(&raw_key).await;
        assert!(valid);
        let info = info.unwrap();
        assert_eq!(info.id, Some(record.id));
        assert_eq!(info.plan, Plan::Partner);
        assert!(storage.health_check().await.database);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_verifications_count_every_call() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            database: Some(file_db_config(&dir.path().join("keys.db"), 5)),
            ..StorageConfig::default()
        };
        let storage = StorageLayer::new(&config).await;
        let store = storage.key_store().unwrap();

        let manager = ApiKeyManager::new(Some(Arc::clone(&store)), test_hasher());
        let (record, raw_key) = assert_ok!(
            manager
                .create_key(KeyRequestFactory::create(Plan::Free))
                .await
        );
        let verifier = Arc::new(ApiKeyVerifier::new(
            verifier_config(),
            Some(Arc::clone(&store)),
        ));

        let handles: Vec<_> = (0..40)
            .map(|_| {
                let verifier = Arc::clone(&verifier);
                let raw_key = raw_key.clone();
                tokio::spawn(async move { verifier.verify(&raw_key).await.0 })
            })
            .collect();

        let mut valid = 0;
        for handle in handles {
            if handle.await.unwrap() {
                valid += 1;
            }
        }

        assert_eq!(valid, 40);
        let stored = store.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(stored.request_count, 40);
    }
}
