//! Configuration loading integration tests

#[cfg(test)]
mod tests {
    use keygate::config::{Config, RateLimitBackend};
    use keygate::core::models::Plan;
    use keygate::storage::StorageLayer;
    use std::collections::HashMap;
    use std::io::Write;

    const EXAMPLE_CONFIG: &str = include_str!("../../config/keygate.yaml.example");

    #[test]
    fn test_example_config_is_valid() {
        let config = Config::from_yaml_str(EXAMPLE_CONFIG).unwrap();

        assert_eq!(config.server().port, 8000);
        assert_eq!(config.auth().api_key_header, "X-API-KEY");
        assert_eq!(config.auth().hash_iterations, 100_000);
        assert_eq!(config.auth().legacy_keys.len(), 3);
        assert_eq!(config.rate_limit().backend, RateLimitBackend::Memory);
        assert_eq!(config.rate_limit().plans.limit_for(Plan::Partner), 120);
        assert!(config.storage().database.is_some());
    }

    #[tokio::test]
    async fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
server:
  port: 9100
auth:
  master_key: "file-master-key-abcdef"
rate_limit:
  plans:
    free: 5
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).await.unwrap();
        assert_eq!(config.server().port, 9100);
        assert_eq!(
            config.auth().master_key.as_deref(),
            Some("file-master-key-abcdef")
        );
        assert_eq!(config.rate_limit().plans.free, 5);
        assert_eq!(config.rate_limit().plans.pro, 60);
    }

    #[tokio::test]
    async fn test_invalid_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "rate_limit:\n  plans:\n    free: 0\n").unwrap();

        assert!(Config::from_file(file.path()).await.is_err());
    }

    #[test]
    fn test_environment_overrides_file_values() {
        let config = Config::from_yaml_str(EXAMPLE_CONFIG).unwrap();
        let env: HashMap<&str, &str> = [
            ("DATABASE_URL", "sqlite::memory:"),
            ("API_MASTER_KEY", "env-master-key-0123456"),
            ("RATE_LIMIT_FREE", "12"),
            ("RATE_LIMIT_BACKEND", "redis"),
        ]
        .into_iter()
        .collect();

        let gateway = config
            .gateway
            .with_env_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(gateway.storage.database.unwrap().url, "sqlite::memory:");
        assert_eq!(
            gateway.auth.master_key.as_deref(),
            Some("env-master-key-0123456")
        );
        assert_eq!(gateway.rate_limit.plans.free, 12);
        assert_eq!(gateway.rate_limit.backend, RateLimitBackend::Redis);
    }

    #[tokio::test]
    async fn test_storage_layer_from_config() {
        let config = Config::from_yaml_str(
            r#"
storage:
  database:
    url: "sqlite::memory:"
"#,
        )
        .unwrap();

        let storage = StorageLayer::new(config.storage()).await;
        assert!(storage.key_store().is_some());

        let health = storage.health_check().await;
        assert!(health.database_configured);
        assert!(health.overall);
    }

    #[tokio::test]
    async fn test_unreachable_database_reports_unhealthy() {
        let config = Config::from_yaml_str(
            r#"
storage:
  database:
    url: "sqlite:///nonexistent-dir/keygate/keys.db"
    connection_timeout: 1
"#,
        )
        .unwrap();

        let storage = StorageLayer::new(config.storage()).await;
        assert!(storage.key_store().is_some());

        let health = storage.health_check().await;
        assert!(health.database_configured);
        assert!(!health.database);
    }
}
