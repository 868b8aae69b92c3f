//! HTTP server core implementation

use crate::config::{Config, RateLimitBackend, ServerConfig};
use crate::core::rate_limiter::RateLimiter;
use crate::server::routes;
use crate::server::state::AppState;
use crate::storage::StorageLayer;
use crate::utils::error::{GatewayError, Result};
use actix_web::{App, HttpServer as ActixHttpServer, middleware::DefaultHeaders, web};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

/// How often persisted keys past their expiry are flipped to `expired`
const KEY_EXPIRY_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// HTTP server
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Application state
    state: AppState,
}

impl HttpServer {
    /// Initialize storage and the rate limiter, then wire the application state
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");

        let storage = StorageLayer::new(config.storage()).await;
        let limiter = build_rate_limiter(config).await;
        let state = AppState::new(config.clone(), storage, limiter);

        Ok(Self {
            config: config.server().clone(),
            state,
        })
    }

    /// Create the Actix-web application
    pub fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state)
            .wrap(TracingLogger::default())
            .wrap(DefaultHeaders::new().add(("Server", "keygate")))
            .configure(routes::health::configure_routes)
            .configure(routes::keys::configure_routes)
            .configure(routes::admin::configure_routes)
    }

    /// Start background maintenance and serve until shutdown
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();
        let workers = self.config.worker_count();

        let _cleanup_task = Arc::clone(self.state.limiter()).start_cleanup_task();
        let _expiry_task = Arc::clone(&self.state.manager).start_expiry_task(KEY_EXPIRY_SWEEP_INTERVAL);

        info!("Starting HTTP server on {} with {} workers", bind_addr, workers);

        let state = web::Data::new(self.state);

        let server = ActixHttpServer::new(move || Self::create_app(state.clone()))
            .workers(workers)
            .bind(&bind_addr)
            .map_err(|e| Self::format_bind_error(e, &bind_addr))?
            .run();

        server
            .await
            .map_err(|e| GatewayError::internal(format!("Server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }

    fn format_bind_error(e: std::io::Error, bind_addr: &str) -> GatewayError {
        match e.kind() {
            std::io::ErrorKind::AddrInUse => GatewayError::Config(format!(
                "Address {} is already in use; set server.port or KEYGATE_PORT",
                bind_addr
            )),
            std::io::ErrorKind::PermissionDenied => GatewayError::Config(format!(
                "Permission denied binding {}",
                bind_addr
            )),
            _ => GatewayError::Io(e),
        }
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// In-memory limiter, backed by Redis when configured and reachable
async fn build_rate_limiter(config: &Config) -> RateLimiter {
    let limiter = RateLimiter::new(config.rate_limit().clone());

    match config.rate_limit().backend {
        RateLimitBackend::Memory => limiter,
        #[cfg(feature = "redis")]
        RateLimitBackend::Redis => {
            match crate::core::rate_limiter::RedisWindowStore::connect(&config.storage().redis)
                .await
            {
                Ok(store) => {
                    info!("Rate limiter using Redis backend");
                    limiter.with_redis(store)
                }
                Err(e) => {
                    warn!("Redis unavailable, rate limiting in memory: {}", e);
                    limiter
                }
            }
        }
        #[cfg(not(feature = "redis"))]
        RateLimitBackend::Redis => {
            warn!("Redis backend requested but the `redis` feature is disabled; rate limiting in memory");
            limiter
        }
    }
}
