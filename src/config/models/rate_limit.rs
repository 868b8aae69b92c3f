//! Rate limiting configuration

use super::*;
use crate::core::models::Plan;
use serde::{Deserialize, Serialize};

/// Rate limiting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Fixed window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// How often rolled-over windows are swept
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
    /// Counter storage
    #[serde(default)]
    pub backend: RateLimitBackend,
    /// Requests allowed per window, by plan
    #[serde(default)]
    pub plans: PlanQuotas,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: default_window_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
            backend: RateLimitBackend::default(),
            plans: PlanQuotas::default(),
        }
    }
}

/// Where window counters live
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitBackend {
    /// Per-process counters
    #[default]
    Memory,
    /// Counters shared through Redis
    Redis,
}

/// Per-plan request quotas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanQuotas {
    #[serde(default = "default_free_quota")]
    pub free: u32,
    #[serde(default = "default_pro_quota")]
    pub pro: u32,
    #[serde(default = "default_partner_quota")]
    pub partner: u32,
    #[serde(default = "default_admin_quota")]
    pub admin: u32,
}

impl Default for PlanQuotas {
    fn default() -> Self {
        Self {
            free: default_free_quota(),
            pro: default_pro_quota(),
            partner: default_partner_quota(),
            admin: default_admin_quota(),
        }
    }
}

impl PlanQuotas {
    pub fn limit_for(&self, plan: Plan) -> u32 {
        match plan {
            Plan::Free => self.free,
            Plan::Pro => self.pro,
            Plan::Partner => self.partner,
            Plan::Admin => self.admin,
        }
    }
}

fn default_free_quota() -> u32 {
    30
}

fn default_pro_quota() -> u32 {
    60
}

fn default_partner_quota() -> u32 {
    120
}

fn default_admin_quota() -> u32 {
    240
}
