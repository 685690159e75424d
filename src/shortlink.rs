//! Short-link token generation for recipe sharing URLs.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Length of the URL-safe token.
pub const HASH_LEN: usize = 8;

/// Derive an 8-character URL-safe token from a recipe's identity fields.
///
/// The recipe id, name and creation timestamp are concatenated, hashed with
/// SHA-256 and base64-url encoded; the token is the first 8 characters of
/// the encoding. `salt` = 0 is the canonical token; higher values produce
/// alternatives for retrying after a stored-hash collision.
pub fn generate_hash(id: Uuid, name: &str, created_at: DateTime<Utc>, salt: u32) -> String {
    let mut input = format!("{}{}{}", id, name, created_at.to_rfc3339());
    if salt > 0 {
        input.push_str(&salt.to_string());
    }

    let digest = Sha256::digest(input.as_bytes());
    let encoded = URL_SAFE.encode(digest);
    encoded[..HASH_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_recipe() -> (Uuid, &'static str, DateTime<Utc>) {
        let id = Uuid::parse_str("4f5a1c2e-8b0d-4e6f-9a3b-7c1d2e3f4a5b").unwrap();
        let created_at = Utc.with_ymd_and_hms(2026, 1, 15, 12, 30, 0).unwrap();
        (id, "Tea", created_at)
    }

    #[test]
    fn test_hash_is_deterministic() {
        let (id, name, created_at) = fixed_recipe();
        let first = generate_hash(id, name, created_at, 0);
        let second = generate_hash(id, name, created_at, 0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_hash_length_and_charset() {
        let (id, name, created_at) = fixed_recipe();
        let hash = generate_hash(id, name, created_at, 0);
        assert_eq!(hash.len(), HASH_LEN);
        assert!(hash
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '='));
    }

    #[test]
    fn test_salt_changes_hash() {
        let (id, name, created_at) = fixed_recipe();
        let canonical = generate_hash(id, name, created_at, 0);
        let salted = generate_hash(id, name, created_at, 1);
        assert_ne!(canonical, salted);
    }

    #[test]
    fn test_different_recipes_hash_differently() {
        let (id, _, created_at) = fixed_recipe();
        let tea = generate_hash(id, "Tea", created_at, 0);
        let soup = generate_hash(id, "Soup", created_at, 0);
        assert_ne!(tea, soup);
    }
}
