//! API key verification and management
//!
//! Credentials are resolved against the master key, the legacy table and the
//! persisted store, in that order.

pub mod management;
pub mod resolver;
pub mod types;
pub mod verifier;

pub use management::ApiKeyManager;
pub use resolver::{KeyResolver, LegacyKeyResolver, MasterKeyResolver, StoreKeyResolver};
pub use types::{CreateApiKeyRequest, Rejection, Resolution, VerifierConfig};
pub use verifier::ApiKeyVerifier;
