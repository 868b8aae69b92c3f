//! # keygate
//!
//! API key verification and plan-based rate limiting.
//!
//! ## Features
//!
//! - **Layered credentials**: a master key, a static legacy table and a
//!   persisted store of salted PBKDF2 digests looked up by an 8 character prefix
//! - **Plan quotas**: fixed per-minute windows for `free`, `pro`, `partner` and
//!   `admin`, counted atomically in memory or in Redis
//! - **Usage metering**: per-key request and throttle counters updated in place
//! - **Degrades, never fails open**: an unreachable store leaves master and legacy
//!   credentials working and every other credential rejected
//!
//! ## Library use
//!
//! ```rust,no_run
//! use keygate::{AccessGate, AccessOutcome, ApiKeyVerifier, RateLimiter, VerifierConfig};
//! use keygate::config::{AuthConfig, RateLimitConfig};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let verifier = ApiKeyVerifier::new(VerifierConfig::from(&AuthConfig::default()), None);
//! let limiter = RateLimiter::new(RateLimitConfig::default());
//! let gate = AccessGate::new(Arc::new(verifier), Arc::new(limiter));
//!
//! match gate.admit("freekey123").await {
//!     AccessOutcome::Granted { info, decision } => {
//!         println!("{} has {} requests left", info.name, decision.remaining());
//!     }
//!     AccessOutcome::Limited { decision, .. } => {
//!         println!("retry in {:?}s", decision.retry_after());
//!     }
//!     AccessOutcome::Unauthorized(_) => println!("invalid key"),
//! }
//! # }
//! ```
//!
//! ## Service mode
//!
//! ```rust,no_run
//! use keygate::{Config, Gateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_with_precedence(Some("config/keygate.yaml")).await?;
//!     let gateway = Gateway::new(config).await?;
//!     gateway.run().await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod auth;
pub mod config;
pub mod core;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export main types
pub use auth::{ApiKeyManager, ApiKeyVerifier, CreateApiKeyRequest, Rejection, VerifierConfig};
pub use config::Config;
pub use core::models::{KeyInfo, KeyRecord, KeySource, KeyStatus, Plan};
pub use core::rate_limiter::{Decision, RateLimiter};
pub use core::{AccessGate, AccessOutcome};
pub use utils::error::{GatewayError, Result};

use tracing::info;

/// The HTTP service around the gate
pub struct Gateway {
    config: Config,
    server: server::HttpServer,
}

impl Gateway {
    /// Create a new gateway instance
    pub async fn new(config: Config) -> Result<Self> {
        info!("Creating new keygate instance");

        let server = server::HttpServer::new(&config).await?;

        Ok(Self { config, server })
    }

    /// Run the HTTP server until shutdown
    pub async fn run(self) -> Result<()> {
        info!("Starting keygate");
        // AuthConfig's Debug masks the credentials
        info!("Configuration: {:#?}", self.config);

        self.server.start().await?;

        Ok(())
    }
}

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build information stamped by the build script
#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_time: &'static str,
    pub git_hash: &'static str,
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: env!("BUILD_TIME"),
            git_hash: env!("GIT_HASH"),
            rust_version: env!("RUST_VERSION"),
        }
    }
}

pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
