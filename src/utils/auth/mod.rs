//! Authentication and security utilities
//!
//! This module provides the cryptographic helpers behind API key storage.

pub mod crypto;

pub use crypto::keys::{
    KeyHasher, extract_api_key_prefix, generate_api_key, mask_api_key,
};
