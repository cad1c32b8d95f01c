//! Argon2id password hashing.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::domain::ports::{HashError, PasswordHasher};

/// Argon2id implementation of the `PasswordHasher` port.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| HashError::new(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_and_wrong_passwords_do_not() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash("correct horse").expect("hash");

        assert!(hasher.verify("correct horse", &hash));
        assert!(!hasher.verify("wrong battery", &hash));
    }

    #[test]
    fn unparseable_hashes_verify_as_false() {
        assert!(!Argon2PasswordHasher.verify("anything", "not-a-phc-string"));
    }

    #[test]
    fn hashing_salts_each_call() {
        let hasher = Argon2PasswordHasher;
        let first = hasher.hash("pw").expect("hash");
        let second = hasher.hash("pw").expect("hash");
        assert_ne!(first, second);
    }
}
