//! Authentication
//!
//! API key verification, usage metering and key lifecycle management.

pub mod api_key;

pub use api_key::{
    ApiKeyManager, ApiKeyVerifier, CreateApiKeyRequest, Rejection, VerifierConfig,
};
