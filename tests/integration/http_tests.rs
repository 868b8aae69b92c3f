//! HTTP service tests through `actix_web::test`

#[cfg(test)]
mod tests {
    use crate::common::TestDatabase;
    use crate::common::fixtures::{MASTER_KEY, service_config};
    use actix_web::http::StatusCode;
    use actix_web::{test, web};
    use keygate::config::RateLimitConfig;
    use keygate::core::models::{KeyRecord, KeyStatus, Plan};
    use keygate::core::rate_limiter::RateLimiter;
    use keygate::server::routes::ApiResponse;
    use keygate::server::routes::admin::CreatedKeyResponse;
    use keygate::server::routes::keys::{UsageResponse, VerifyKeyResponse};
    use keygate::server::{AppState, HttpServer};
    use keygate::storage::StorageLayer;
    use keygate::utils::error::ErrorResponse;
    use serde_json::{Value, json};

    /// Long windows so a test never straddles a rollover
    fn rate_limit(free_quota: u32) -> RateLimitConfig {
        let mut rate_limit = RateLimitConfig {
            window_secs: 3600,
            ..RateLimitConfig::default()
        };
        rate_limit.plans.free = free_quota;
        rate_limit
    }

    fn state_with(storage: StorageLayer, rate_limit: RateLimitConfig) -> web::Data<AppState> {
        let limiter = RateLimiter::new(rate_limit.clone());
        web::Data::new(AppState::new(service_config(rate_limit), storage, limiter))
    }

    #[actix_web::test]
    async fn test_health_endpoints() {
        let db = TestDatabase::new().await;
        let app =
            test::init_service(HttpServer::create_app(state_with(db.storage_layer(), rate_limit(30))))
                .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("server").unwrap(), "keygate");

        let req = test::TestRequest::get().uri("/health/detailed").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["status"], "healthy");
        assert_eq!(body["data"]["storage"]["database"], true);
        assert_eq!(body["data"]["rate_limiting"]["enabled"], true);

        let req = test::TestRequest::get().uri("/version").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn test_detailed_health_without_database() {
        let app = test::init_service(HttpServer::create_app(state_with(
            StorageLayer::default(),
            rate_limit(30),
        )))
        .await;

        let req = test::TestRequest::get().uri("/health/detailed").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["storage"]["database_configured"], false);
        assert_eq!(body["data"]["status"], "healthy");
    }

    #[actix_web::test]
    async fn test_verify_endpoint_is_public() {
        let app = test::init_service(HttpServer::create_app(state_with(
            StorageLayer::default(),
            rate_limit(30),
        )))
        .await;

        let req = test::TestRequest::post()
            .uri("/v1/keys/verify")
            .set_json(json!({ "api_key": "prokey456" }))
            .to_request();
        let body: ApiResponse<VerifyKeyResponse> = test::call_and_read_body_json(&app, req).await;
        let verified = body.data.unwrap();
        assert!(verified.valid);
        assert_eq!(verified.info.unwrap().plan, Plan::Pro);

        let req = test::TestRequest::post()
            .uri("/v1/keys/verify")
            .set_json(json!({ "api_key": "definitely-not-a-key" }))
            .to_request();
        let body: ApiResponse<VerifyKeyResponse> = test::call_and_read_body_json(&app, req).await;
        let verified = body.data.unwrap();
        assert!(!verified.valid);
        assert!(verified.info.is_none());
    }

    #[actix_web::test]
    async fn test_usage_requires_a_key() {
        let app = test::init_service(HttpServer::create_app(state_with(
            StorageLayer::default(),
            rate_limit(30),
        )))
        .await;

        let req = test::TestRequest::get().uri("/v1/usage").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error.code, "UNAUTHORIZED");
    }

    #[actix_web::test]
    async fn test_usage_reports_quota_after_consumption() {
        let app = test::init_service(HttpServer::create_app(state_with(
            StorageLayer::default(),
            rate_limit(30),
        )))
        .await;

        let req = test::TestRequest::get()
            .uri("/v1/usage")
            .insert_header(("X-API-KEY", "freekey123"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("x-ratelimit-remaining").unwrap(), "29");

        let body: ApiResponse<UsageResponse> = test::read_body_json(resp).await;
        let usage = body.data.unwrap();
        assert_eq!(usage.key.plan, Plan::Free);
        assert_eq!(usage.quota.limit(), 30);
        assert_eq!(usage.quota.remaining(), 29);
    }

    #[actix_web::test]
    async fn test_throttled_request_gets_429() {
        let app = test::init_service(HttpServer::create_app(state_with(
            StorageLayer::default(),
            rate_limit(1),
        )))
        .await;

        let request = || {
            test::TestRequest::get()
                .uri("/v1/usage")
                .insert_header(("Authorization", "ApiKey freekey123"))
                .to_request()
        };

        assert_eq!(
            test::call_service(&app, request()).await.status(),
            StatusCode::OK
        );

        let resp = test::call_service(&app, request()).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(resp.headers().contains_key("retry-after"));
        assert_eq!(resp.headers().get("x-ratelimit-limit").unwrap(), "1");

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error.code, "RATE_LIMIT_EXCEEDED");
        assert!(body.error.retry_after.unwrap() >= 1);
    }

    #[actix_web::test]
    async fn test_admin_routes_reject_non_admin_plans() {
        let app = test::init_service(HttpServer::create_app(state_with(
            StorageLayer::default(),
            rate_limit(30),
        )))
        .await;

        let req = test::TestRequest::get()
            .uri("/admin/rate-limit/metrics")
            .insert_header(("X-API-KEY", "partnerkey789"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/admin/rate-limit/metrics")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_admin_metrics() {
        let app = test::init_service(HttpServer::create_app(state_with(
            StorageLayer::default(),
            rate_limit(30),
        )))
        .await;

        let req = test::TestRequest::get()
            .uri("/v1/usage")
            .insert_header(("X-API-KEY", "freekey123"))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get()
            .uri("/admin/rate-limit/metrics")
            .insert_header(("X-API-KEY", MASTER_KEY))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        // the usage call and the metrics call itself
        assert_eq!(body["data"]["total_allowed"], 2);
        assert_eq!(body["data"]["total_denied"], 0);
        assert_eq!(body["data"]["tracked_identities"], 2);
    }

    #[actix_web::test]
    async fn test_key_lifecycle_over_http() {
        let db = TestDatabase::new().await;
        let app =
            test::init_service(HttpServer::create_app(state_with(db.storage_layer(), rate_limit(30))))
                .await;

        // Issue
        let req = test::TestRequest::post()
            .uri("/admin/keys")
            .insert_header(("X-API-KEY", MASTER_KEY))
            .set_json(json!({ "name": "CI key", "plan": "pro", "user_id": "user-7" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: ApiResponse<CreatedKeyResponse> = test::read_body_json(resp).await;
        let created = body.data.unwrap();
        assert!(created.api_key.starts_with("kg_"));
        assert_eq!(created.key.plan, Plan::Pro);

        // Use
        let req = test::TestRequest::get()
            .uri("/v1/usage")
            .insert_header(("X-API-KEY", created.api_key.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("x-ratelimit-limit").unwrap(), "60");

        // Inspect
        let req = test::TestRequest::get()
            .uri(&format!("/admin/keys/{}", created.key.id))
            .insert_header(("X-API-KEY", MASTER_KEY))
            .to_request();
        let body: ApiResponse<KeyRecord> = test::call_and_read_body_json(&app, req).await;
        let stored = body.data.unwrap();
        assert_eq!(stored.request_count, 1);
        assert_eq!(stored.status, KeyStatus::Active);

        // Disable
        let req = test::TestRequest::post()
            .uri(&format!("/admin/keys/{}/disable", created.key.id))
            .insert_header(("X-API-KEY", MASTER_KEY))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/v1/usage")
            .insert_header(("X-API-KEY", created.api_key.as_str()))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );

        // List
        let req = test::TestRequest::get()
            .uri("/admin/users/user-7/keys")
            .insert_header(("X-API-KEY", MASTER_KEY))
            .to_request();
        let body: ApiResponse<Vec<KeyRecord>> = test::call_and_read_body_json(&app, req).await;
        let keys = body.data.unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].status, KeyStatus::Disabled);
    }

    #[actix_web::test]
    async fn test_admin_key_errors() {
        let db = TestDatabase::new().await;
        let app =
            test::init_service(HttpServer::create_app(state_with(db.storage_layer(), rate_limit(30))))
                .await;

        let req = test::TestRequest::get()
            .uri("/admin/keys/999")
            .insert_header(("X-API-KEY", MASTER_KEY))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );

        let req = test::TestRequest::post()
            .uri("/admin/keys")
            .insert_header(("X-API-KEY", MASTER_KEY))
            .set_json(json!({ "name": "root", "plan": "admin", "user_id": "user-7" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );
    }

    #[actix_web::test]
    async fn test_key_creation_without_store_is_unavailable() {
        let app = test::init_service(HttpServer::create_app(state_with(
            StorageLayer::default(),
            rate_limit(30),
        )))
        .await;

        let req = test::TestRequest::post()
            .uri("/admin/keys")
            .insert_header(("X-API-KEY", MASTER_KEY))
            .set_json(json!({ "name": "CI key", "plan": "free", "user_id": "user-7" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error.message, "Database operation failed");
    }
}
