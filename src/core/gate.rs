//! Credential admission: verification followed by rate limiting

use crate::auth::{ApiKeyVerifier, Rejection};
use crate::core::models::KeyInfo;
use crate::core::rate_limiter::{Decision, RateLimiter};
use crate::utils::auth::mask_api_key;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of admitting a request credential
#[derive(Debug, Clone, PartialEq)]
pub enum AccessOutcome {
    /// The credential did not verify
    Unauthorized(Rejection),
    /// Verified, but over quota for the current window
    Limited { info: KeyInfo, decision: Decision },
    /// Verified and within quota
    Granted { info: KeyInfo, decision: Decision },
}

impl AccessOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessOutcome::Granted { .. })
    }

    pub fn decision(&self) -> Option<&Decision> {
        match self {
            AccessOutcome::Unauthorized(_) => None,
            AccessOutcome::Limited { decision, .. } | AccessOutcome::Granted { decision, .. } => {
                Some(decision)
            }
        }
    }
}

/// Verifier and limiter composed into a single admission check
#[derive(Debug, Clone)]
pub struct AccessGate {
    verifier: Arc<ApiKeyVerifier>,
    limiter: Arc<RateLimiter>,
}

impl AccessGate {
    pub fn new(verifier: Arc<ApiKeyVerifier>, limiter: Arc<RateLimiter>) -> Self {
        Self { verifier, limiter }
    }

    pub fn verifier(&self) -> &Arc<ApiKeyVerifier> {
        &self.verifier
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub async fn admit(&self, raw_key: &str) -> AccessOutcome {
        self.admit_at(raw_key, Utc::now().timestamp_millis()).await
    }

    /// Admit as of `now_ms` (unix milliseconds)
    pub async fn admit_at(&self, raw_key: &str, now_ms: i64) -> AccessOutcome {
        let info = match self.verifier.verify_detailed(raw_key).await {
            Ok(info) => info,
            Err(reason) => {
                debug!(key = %mask_api_key(raw_key), %reason, "Request credential rejected");
                return AccessOutcome::Unauthorized(reason);
            }
        };

        let identity = info.identity();
        let decision = self.limiter.consume_at(&identity, info.plan, now_ms).await;

        if decision.is_allowed() {
            return AccessOutcome::Granted { info, decision };
        }

        let recorded = self.verifier.record_rate_limit_hit(raw_key).await;
        info!(
            identity = %identity,
            plan = %info.plan,
            recorded,
            "Request throttled"
        );
        AccessOutcome::Limited { info, decision }
    }
}
