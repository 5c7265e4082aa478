//! Driven port for password hashing.

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashers.
    pub enum PasswordHashError {
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// The stored hash is not in a recognised format.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Driven port hashing and verifying user passwords.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` into a self-describing string.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check `password` against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}
