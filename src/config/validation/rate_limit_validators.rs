//! Rate limit configuration validators

use super::trait_def::Validate;
use crate::config::models::*;
use crate::core::models::Plan;

impl Validate for RateLimitConfig {
    fn validate(&self) -> Result<(), String> {
        if self.window_secs == 0 {
            return Err("Rate limit window must be greater than 0".to_string());
        }

        if self.cleanup_interval_secs == 0 {
            return Err("Rate limit cleanup interval must be greater than 0".to_string());
        }

        self.plans.validate()
    }
}

impl Validate for PlanQuotas {
    fn validate(&self) -> Result<(), String> {
        for plan in Plan::ALL {
            if self.limit_for(plan) == 0 {
                return Err(format!("Quota for plan '{}' must be greater than 0", plan));
            }
        }

        Ok(())
    }
}
