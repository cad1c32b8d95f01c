//! Driven ports: contracts the domain expects adapters to satisfy.
//!
//! Repository ports cover one collection each; the read-model executor
//! port runs composed pipelines; the credential ports wrap the signed
//! token and password-hash primitives. Adapters live under
//! `crate::outbound`.

pub mod comment_repository;
pub mod like_repository;
pub mod password_hasher;
pub mod playlist_repository;
pub mod read_model_executor;
pub mod subscription_repository;
pub mod token_issuer;
pub mod tweet_repository;
pub mod user_repository;
pub mod video_repository;

pub use comment_repository::CommentRepository;
pub use like_repository::LikeRepository;
pub use password_hasher::{HashError, PasswordHasher};
pub use playlist_repository::PlaylistRepository;
pub use read_model_executor::ReadModelExecutor;
pub use subscription_repository::SubscriptionRepository;
pub use token_issuer::{TokenError, TokenIssuer, TokenPair};
pub use tweet_repository::TweetRepository;
pub use user_repository::UserRepository;
pub use video_repository::VideoRepository;

#[cfg(test)]
pub use comment_repository::MockCommentRepository;
#[cfg(test)]
pub use like_repository::MockLikeRepository;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
#[cfg(test)]
pub use playlist_repository::MockPlaylistRepository;
#[cfg(test)]
pub use read_model_executor::MockReadModelExecutor;
#[cfg(test)]
pub use subscription_repository::MockSubscriptionRepository;
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
#[cfg(test)]
pub use tweet_repository::MockTweetRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
#[cfg(test)]
pub use video_repository::MockVideoRepository;

/// Failure raised by store-backed ports.
///
/// Adapters collapse their native errors into these categories; services
/// translate them into domain errors at the call site.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store connection failed: {message}")]
    Connection { message: String },
    /// A query or mutation failed during execution.
    #[error("store query failed: {message}")]
    Query { message: String },
    /// A uniqueness constraint rejected the write.
    #[error("duplicate record: {message}")]
    Duplicate { message: String },
}

impl StoreError {
    /// Connection-category constructor.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Query-category constructor.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Duplicate-category constructor.
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_format_their_message() {
        assert_eq!(
            StoreError::connection("refused").to_string(),
            "store connection failed: refused"
        );
        assert_eq!(
            StoreError::query("boom").to_string(),
            "store query failed: boom"
        );
        assert_eq!(
            StoreError::duplicate("username").to_string(),
            "duplicate record: username"
        );
    }
}
