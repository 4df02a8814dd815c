//! Upload request signing.
//!
//! The provider verifies a SHA-256 digest over the alphabetically sorted
//! signed parameters (`key=value` joined by `&`) with the API secret appended.

use sha2::{Digest, Sha256};

/// Build the string that gets hashed for a set of signed parameters.
pub fn string_to_sign(params: &[(&str, String)]) -> String {
    let mut sorted: Vec<_> = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    sorted
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Sign parameters with the API secret, returning a lowercase hex digest.
pub fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(string_to_sign(params).as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}
