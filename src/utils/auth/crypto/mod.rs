//! Cryptographic utilities for the gateway
//!
//! API keys are never stored in clear. The persisted form is a salted
//! PBKDF2-HMAC-SHA256 digest plus a short prefix used as a lookup index.

pub mod keys;

/// Constant-time string comparison
pub(crate) fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (a_byte, b_byte) in a.bytes().zip(b.bytes()) {
        result |= a_byte ^ b_byte;
    }

    result == 0
}
