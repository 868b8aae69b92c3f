//! Key generation, hashing and prefix utilities

use pbkdf2::pbkdf2_hmac;
use rand::{Rng, distributions::Alphanumeric};
use sha2::Sha256;

/// Application-wide salt applied to every API key digest
pub const DEFAULT_HASH_SALT: &str = "keygate.api-key.v1";

/// PBKDF2 rounds used for API key digests
pub const DEFAULT_HASH_ITERATIONS: u32 = 100_000;

/// Number of leading characters stored as the lookup prefix
pub const KEY_PREFIX_LEN: usize = 8;

/// Marker prepended to generated keys
pub const GENERATED_KEY_PREFIX: &str = "kg_";

const DIGEST_LEN: usize = 32;

/// Salted, slow one-way hashing of raw API keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyHasher {
    salt: String,
    iterations: u32,
}

impl KeyHasher {
    pub fn new(salt: impl Into<String>, iterations: u32) -> Self {
        Self {
            salt: salt.into(),
            iterations: iterations.max(1),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash a raw key into its hex-encoded storage form
    pub fn hash(&self, raw_key: &str) -> String {
        let mut digest = [0u8; DIGEST_LEN];
        pbkdf2_hmac::<Sha256>(
            raw_key.as_bytes(),
            self.salt.as_bytes(),
            self.iterations,
            &mut digest,
        );
        hex::encode(digest)
    }
}

impl Default for KeyHasher {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_SALT, DEFAULT_HASH_ITERATIONS)
    }
}

/// Generate a new random API key
pub fn generate_api_key() -> String {
    let random_part: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(40)
        .map(char::from)
        .collect();

    format!("{}{}", GENERATED_KEY_PREFIX, random_part)
}

/// Lookup prefix for a raw key: its first eight characters, or the whole key
/// when it is shorter.
pub fn extract_api_key_prefix(api_key: &str) -> String {
    api_key.chars().take(KEY_PREFIX_LEN).collect()
}

/// Loggable form of a raw key
pub fn mask_api_key(api_key: &str) -> String {
    if api_key.chars().count() > KEY_PREFIX_LEN {
        format!("{}...", extract_api_key_prefix(api_key))
    } else {
        "***".to_string()
    }
}
