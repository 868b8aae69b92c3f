//! Limiter counters exposed to the admin API

use crate::core::models::Plan;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Running totals. Relaxed ordering: the numbers are informational only.
#[derive(Debug, Default)]
pub(super) struct RateLimitMetrics {
    allowed: AtomicU64,
    denied: AtomicU64,
    denied_by_plan: [AtomicU64; 4],
}

fn plan_slot(plan: Plan) -> usize {
    match plan {
        Plan::Free => 0,
        Plan::Pro => 1,
        Plan::Partner => 2,
        Plan::Admin => 3,
    }
}

impl RateLimitMetrics {
    pub(super) fn record_allowed(&self) {
        self.allowed.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_denied(&self, plan: Plan) {
        self.denied.fetch_add(1, Ordering::Relaxed);
        self.denied_by_plan[plan_slot(plan)].fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn snapshot(&self, tracked_identities: usize) -> RateLimitMetricsSnapshot {
        let denied_by_plan = Plan::ALL
            .into_iter()
            .map(|plan| {
                (
                    plan,
                    self.denied_by_plan[plan_slot(plan)].load(Ordering::Relaxed),
                )
            })
            .collect();

        RateLimitMetricsSnapshot {
            total_allowed: self.allowed.load(Ordering::Relaxed),
            total_denied: self.denied.load(Ordering::Relaxed),
            denied_by_plan,
            tracked_identities,
        }
    }
}

/// Point-in-time copy of the limiter counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitMetricsSnapshot {
    pub total_allowed: u64,
    pub total_denied: u64,
    pub denied_by_plan: BTreeMap<Plan, u64>,
    /// Identities with a live in-memory window
    pub tracked_identities: usize,
}
