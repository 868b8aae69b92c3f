//! Error handling for the gateway
//!
//! This module defines the crate error type, its helper constructors and the
//! structured HTTP error body returned to callers.

#![allow(missing_docs)]

mod helpers;
mod response;
mod types;

pub use response::{ErrorDetail, ErrorResponse};
pub use types::{GatewayError, Result};
