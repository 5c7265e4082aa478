//! Argon2id password hashing producing PHC strings.

use argon2::Argon2;
use argon2::password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use rand::RngCore;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// [`PasswordHasher`] backed by Argon2id with default parameters.
#[derive(Default, Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

fn fresh_salt() -> Result<SaltString, PasswordHashError> {
    let mut bytes = [0_u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    SaltString::encode_b64(&bytes).map_err(|err| PasswordHashError::hash(err.to_string()))
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let salt = fresh_salt()?;
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let parsed =
            PasswordHash::new(hash).map_err(|err| PasswordHashError::malformed_hash(err.to_string()))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn hashes_verify_only_the_original_password() {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash("correct horse").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hash).expect("verify"));
        assert!(!hasher.verify("battery staple", &hash).expect("verify"));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let hasher = Argon2PasswordHasher::new();
        let first = hasher.hash("pw").expect("first");
        let second = hasher.hash("pw").expect("second");
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hashes_are_reported() {
        let err = Argon2PasswordHasher::new()
            .verify("pw", "plaintext")
            .expect_err("malformed");
        assert!(matches!(err, PasswordHashError::MalformedHash { .. }));
    }
}
