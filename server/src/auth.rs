//! Password hashing and bearer-token extraction.
//!
//! Passwords are stored as hex-encoded SHA-256 digests over a per-account
//! random salt concatenated with the password. Session tokens are opaque
//! UUIDs handed out at registration and login.

use axum::http::{header, HeaderMap};
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

const SALT_BYTES: usize = 16;

pub fn generate_salt(rng: &mut impl Rng) -> String {
    let mut salt = [0u8; SALT_BYTES];
    rng.fill(&mut salt);
    hex::encode(salt)
}

pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_password(password: &str, salt: &str, hash: &str) -> bool {
    hash_password(password, salt) == hash
}

/// Extracts the session token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<Uuid> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    Uuid::parse_str(token.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_hash_round_trip() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let salt = generate_salt(&mut rng);
        assert_eq!(salt.len(), SALT_BYTES * 2);
        let hash = hash_password("hunter2", &salt);
        assert!(verify_password("hunter2", &salt, &hash));
        assert!(!verify_password("hunter3", &salt, &hash));
    }

    #[test]
    fn test_same_password_different_salts_differ() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let first = generate_salt(&mut rng);
        let second = generate_salt(&mut rng);
        assert_ne!(first, second);
        assert_ne!(
            hash_password("hunter2", &first),
            hash_password("hunter2", &second)
        );
    }

    #[test]
    fn test_bearer_token_parsing() {
        let token = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        assert_eq!(bearer_token(&headers), Some(token));

        let mut bad = HeaderMap::new();
        bad.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&bad), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
