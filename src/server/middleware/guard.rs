//! API key guard: credential verification and plan rate limiting

use crate::core::AccessOutcome;
use crate::core::models::KeyInfo;
use crate::server::middleware::helpers::{
    apply_rate_limit_headers, extract_api_key, rate_limited_response, unauthorized_response,
};
use crate::server::state::AppState;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::{HttpMessage, HttpRequest, web};
use futures::future::{Ready, ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use tracing::{debug, error};

/// Guard middleware for Actix-web
///
/// Admits a request only if its credential verifies and the key's plan quota
/// allows it. Granted requests carry the [`KeyInfo`] in their extensions.
pub struct ApiKeyGuard;

impl<S, B> Transform<S, ServiceRequest> for ApiKeyGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = ApiKeyGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyGuardService {
            service: Rc::new(service),
        }))
    }
}

/// Service implementation for the guard middleware
pub struct ApiKeyGuardService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ApiKeyGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                error!("Application state missing; rejecting guarded request");
                return Err(actix_web::error::ErrorInternalServerError(
                    "Application state missing",
                ));
            };

            let raw_key = extract_api_key(
                req.headers(),
                &state.config.auth().api_key_header,
                req.query_string(),
            )
            .unwrap_or_default();

            match state.gate.admit(&raw_key).await {
                AccessOutcome::Unauthorized(reason) => {
                    debug!(path = %req.path(), %reason, "Unauthorized request");
                    Ok(req
                        .into_response(unauthorized_response())
                        .map_into_right_body())
                }
                AccessOutcome::Limited { decision, .. } => Ok(req
                    .into_response(rate_limited_response(&decision))
                    .map_into_right_body()),
                AccessOutcome::Granted { info, decision } => {
                    req.extensions_mut().insert(info);
                    let mut res = service.call(req).await?;
                    apply_rate_limit_headers(res.headers_mut(), &decision);
                    Ok(res.map_into_left_body())
                }
            }
        })
    }
}

/// Key info attached by [`ApiKeyGuard`] to a granted request
pub fn authenticated_key(req: &HttpRequest) -> Result<KeyInfo, actix_web::Error> {
    req.extensions()
        .get::<KeyInfo>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorUnauthorized("Missing API key context"))
}
