//! Port wrapping the signed-token primitive.
//!
//! The domain issues and verifies opaque credential strings through this
//! contract; the signing scheme lives in the adapter.

use crate::domain::ids::UserId;

/// Freshly issued access/renewal credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Failures raised by token issuance and verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The credential was once valid but has expired.
    #[error("credential has expired")]
    Expired,
    /// The credential fails signature or shape verification.
    #[error("credential is not valid")]
    Invalid,
    /// Signing a new credential failed.
    #[error("credential signing failed: {message}")]
    Signing { message: String },
}

/// Issues and verifies the two credential classes.
///
/// Access and renewal credentials are verified against distinct keys, so
/// one class can never be replayed as the other.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Issue a fresh access + renewal pair for the subject.
    fn issue_pair(&self, subject: UserId) -> Result<TokenPair, TokenError>;

    /// Verify an access credential and return its subject.
    fn verify_access(&self, token: &str) -> Result<UserId, TokenError>;

    /// Verify a renewal credential and return its subject.
    fn verify_refresh(&self, token: &str) -> Result<UserId, TokenError>;
}
