//! Port wrapping the password-hash primitive.

/// Failure raised while hashing a password.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct HashError {
    pub message: String,
}

impl HashError {
    /// Build a hash error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Hashes and verifies user passwords.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted hash of the password.
    fn hash(&self, password: &str) -> Result<String, HashError>;

    /// Check a candidate password against a stored hash. Unparseable
    /// hashes verify as false rather than erroring.
    fn verify(&self, password: &str, hash: &str) -> bool;
}
