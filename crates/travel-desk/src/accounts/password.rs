//! Password hashing using Argon2id.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use std::sync::OnceLock;

const DECOY_PASSWORD: &str = "travel-desk-decoy-password";

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// Hash `password` with a fresh random salt, returning a PHC string.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordError::Hash(err.to_string()))
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = argon2::PasswordHash::new(hash)
        .map_err(|err| PasswordError::MalformedHash(err.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(PasswordError::MalformedHash(err.to_string())),
    }
}

fn decoy_hash() -> Option<&'static str> {
    static DECOY: OnceLock<Option<String>> = OnceLock::new();
    DECOY
        .get_or_init(|| hash_password(DECOY_PASSWORD).ok())
        .as_deref()
}

/// Run a full verification against a throwaway hash so that a login for an
/// unknown email costs the same as one with a wrong password.
pub fn verify_decoy(password: &str) {
    if let Some(hash) = decoy_hash() {
        let _ = verify_password(password, hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("hunter22").expect("hash");
        assert!(verify_password("hunter22", &hash).expect("verify"));
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hash = hash_password("hunter22").expect("hash");
        assert!(!verify_password("hunter23", &hash).expect("verify"));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("same-password").expect("hash");
        let second = hash_password("same-password").expect("hash");
        assert_ne!(first, second);
        assert!(!first.contains("same-password"));
    }

    #[test]
    fn malformed_hash_returns_error() {
        assert!(verify_password("pw", "not-a-hash").is_err());
    }

    #[test]
    fn decoy_hash_costs_the_same_as_real_hashes() {
        let decoy = argon2::PasswordHash::new(decoy_hash().expect("decoy hash"))
            .expect("decoy parses");
        let real_hash = hash_password("window-seat").expect("hash");
        let real = argon2::PasswordHash::new(&real_hash).expect("real parses");

        assert_eq!(decoy.algorithm, real.algorithm);
        assert_eq!(decoy.params.to_string(), real.params.to_string());
    }

    #[test]
    fn decoy_never_matches_real_passwords() {
        verify_decoy("");
        verify_decoy("window-seat");
        assert!(!verify_password("window-seat", decoy_hash().expect("decoy")).expect("verify"));
    }
}
