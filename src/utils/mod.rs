//! Utility modules for the gateway
//!
//! - **auth**: key generation, hashing and credential masking
//! - **error**: error type, helpers and HTTP error bodies
//! - **logging**: tracing subscriber setup

pub mod auth;
pub mod error;
pub mod logging;
