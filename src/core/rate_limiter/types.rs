//! Rate limiter types and data structures

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Allow {
        /// Requests allowed per window
        limit: u32,
        /// Requests left in the current window
        remaining: u32,
        /// Unix time (seconds) the current window ends
        reset_at: i64,
    },
    Deny {
        limit: u32,
        remaining: u32,
        reset_at: i64,
        /// Whole seconds until the window resets, at least 1
        retry_after_seconds: u64,
    },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }

    pub fn limit(&self) -> u32 {
        match self {
            Decision::Allow { limit, .. } | Decision::Deny { limit, .. } => *limit,
        }
    }

    pub fn remaining(&self) -> u32 {
        match self {
            Decision::Allow { remaining, .. } | Decision::Deny { remaining, .. } => *remaining,
        }
    }

    pub fn reset_at(&self) -> i64 {
        match self {
            Decision::Allow { reset_at, .. } | Decision::Deny { reset_at, .. } => *reset_at,
        }
    }

    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Decision::Allow { .. } => None,
            Decision::Deny {
                retry_after_seconds,
                ..
            } => Some(*retry_after_seconds),
        }
    }
}

/// Request counter for one identity within one window
#[derive(Debug)]
pub(super) struct WindowCounter {
    /// Unix time (seconds) the window began
    pub(super) window_start: i64,
    pub(super) count: AtomicU32,
}

impl WindowCounter {
    pub(super) fn new(window_start: i64) -> Self {
        Self {
            window_start,
            count: AtomicU32::new(0),
        }
    }

    /// Take one slot if fewer than `limit` are used. Returns the new count.
    pub(super) fn try_acquire(&self, limit: u32) -> Option<u32> {
        let mut current = self.count.load(Ordering::Acquire);
        loop {
            if current >= limit {
                return None;
            }
            match self.count.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(current + 1),
                Err(actual) => current = actual,
            }
        }
    }

    pub(super) fn used(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }
}
