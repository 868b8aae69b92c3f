//! Administrative endpoints, restricted to admin-plan credentials

use crate::auth::CreateApiKeyRequest;
use crate::core::models::{KeyInfo, KeyRecord, Plan};
use crate::server::middleware::{ApiKeyGuard, authenticated_key};
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Configure admin routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(ApiKeyGuard)
            .route("/rate-limit/metrics", web::get().to(rate_limit_metrics))
            .route("/keys", web::post().to(create_key))
            .route("/keys/expire", web::post().to(expire_stale_keys))
            .route("/keys/{id}", web::get().to(get_key))
            .route("/keys/{id}/disable", web::post().to(disable_key))
            .route("/keys/{id}/expiration", web::put().to(update_expiration))
            .route("/users/{user_id}/keys", web::get().to(list_user_keys)),
    );
}

/// A freshly issued key; the raw value is only ever returned here
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedKeyResponse {
    pub api_key: String,
    pub key: KeyRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateExpirationRequest {
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiredKeysResponse {
    pub expired: u64,
}

fn require_admin(req: &HttpRequest) -> ActixResult<KeyInfo> {
    let caller = authenticated_key(req)?;
    if caller.plan != Plan::Admin {
        return Err(GatewayError::forbidden("Admin plan required").into());
    }
    Ok(caller)
}

async fn rate_limit_metrics(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    require_admin(&req)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(state.limiter().metrics())))
}

async fn create_key(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreateApiKeyRequest>,
) -> ActixResult<HttpResponse> {
    let caller = require_admin(&req)?;
    let (key, api_key) = state.manager.create_key(body.into_inner()).await?;
    info!(id = key.id, issued_by = %caller.identity(), "API key issued");

    Ok(HttpResponse::Created().json(ApiResponse::success(CreatedKeyResponse { api_key, key })))
}

async fn get_key(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    require_admin(&req)?;
    let id = path.into_inner();
    let key = state
        .manager
        .get_key(id)
        .await?
        .ok_or_else(|| GatewayError::not_found(format!("API key {}", id)))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(key)))
}

async fn disable_key(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let caller = require_admin(&req)?;
    let id = path.into_inner();
    state.manager.disable_key(id).await?;
    info!(id, disabled_by = %caller.identity(), "API key disabled");

    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "id": id }))))
}

async fn update_expiration(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdateExpirationRequest>,
) -> ActixResult<HttpResponse> {
    require_admin(&req)?;
    let id = path.into_inner();
    state.manager.update_expiration(id, body.expires_at).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "id": id,
        "expires_at": body.expires_at,
    }))))
}

async fn expire_stale_keys(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    require_admin(&req)?;
    let expired = state.manager.expire_stale_keys().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(ExpiredKeysResponse { expired })))
}

async fn list_user_keys(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    require_admin(&req)?;
    let keys = state.manager.list_user_keys(&path).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(keys)))
}
