//! Caller-facing key endpoints

use crate::core::models::KeyInfo;
use crate::core::rate_limiter::Decision;
use crate::server::middleware::{ApiKeyGuard, authenticated_key};
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configure key routes
///
/// The verify endpoint is registered ahead of the guarded `/v1` scope so the
/// scope does not swallow it.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/v1/keys/verify", web::post().to(verify_key))
        .service(
            web::scope("/v1")
                .wrap(ApiKeyGuard)
                .route("/usage", web::get().to(usage)),
        );
}

/// Body of a verification request
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyKeyRequest {
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyKeyResponse {
    pub valid: bool,
    pub info: Option<KeyInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageResponse {
    pub key: KeyInfo,
    pub quota: Decision,
}

/// Verify a credential passed in the body; no quota is consumed
async fn verify_key(
    state: web::Data<AppState>,
    body: web::Json<VerifyKeyRequest>,
) -> ActixResult<HttpResponse> {
    let (valid, info) = state.verifier().verify(&body.api_key).await;
    debug!(valid, "Key verification requested");

    Ok(HttpResponse::Ok().json(ApiResponse::success(VerifyKeyResponse { valid, info })))
}

/// Caller's key and remaining quota for the current window
async fn usage(req: HttpRequest, state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let key = authenticated_key(&req)?;
    let quota = state.limiter().peek(&key.identity(), key.plan).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(UsageResponse { key, quota })))
}
