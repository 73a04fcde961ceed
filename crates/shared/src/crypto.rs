//! Cryptographic utilities for project API key generation and hashing.
//!
//! API keys are opaque bearer credentials of the form `nh_<32 alphanumeric>`.
//! Only the SHA-256 hash is persisted; the first 8 characters after the
//! prefix are retained in plaintext for display and support lookups.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Number of random characters in a generated API key (after the `nh_` prefix).
const API_KEY_RANDOM_LEN: usize = 32;

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a new project API key with the `nh_` prefix.
///
/// Uses the thread-local CSPRNG. The returned key is shown to the caller
/// exactly once; only its hash is stored.
pub fn generate_api_key() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    let key: String = (0..API_KEY_RANDOM_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();

    format!("nh_{}", key)
}

/// Extracts the display prefix from an API key (first 8 characters after "nh_").
///
/// Returns `None` for keys that do not match the expected shape, so callers
/// can reject malformed credentials before hitting the database.
pub fn extract_key_prefix(key: &str) -> Option<&str> {
    if key.starts_with("nh_") && key.len() >= 11 {
        Some(&key[3..11])
    } else {
        None
    }
}
