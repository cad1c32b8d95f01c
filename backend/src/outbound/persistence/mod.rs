//! PostgreSQL persistence adapters built on Diesel.

pub mod diesel_comment_repository;
pub mod diesel_like_repository;
pub mod diesel_playlist_repository;
pub mod diesel_read_models;
pub mod diesel_subscription_repository;
pub mod diesel_tweet_repository;
pub mod diesel_user_repository;
pub mod diesel_video_repository;
pub mod memory;
pub mod models;
pub mod pool;
pub mod schema;

pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_like_repository::DieselLikeRepository;
pub use diesel_playlist_repository::DieselPlaylistRepository;
pub use diesel_read_models::DieselReadModels;
pub use diesel_subscription_repository::DieselSubscriptionRepository;
pub use diesel_tweet_repository::DieselTweetRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_video_repository::DieselVideoRepository;
pub use memory::MemoryStore;
pub use pool::{DbPool, PoolConfig, PoolError};

use tracing::debug;

use crate::domain::ports::StoreError;

/// Map pool checkout failures to the store error taxonomy.
pub(crate) fn map_pool_error(error: PoolError) -> StoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StoreError::connection(message)
        }
    }
}

/// Map Diesel failures to the store error taxonomy.
pub(crate) fn map_diesel_error(error: diesel::result::Error) -> StoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            StoreError::duplicate(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StoreError::connection("database connection error")
        }
        DieselError::NotFound => StoreError::query("record not found"),
        _ => StoreError::query("database error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_map_to_connection() {
        let err = map_pool_error(PoolError::checkout("refused"));
        assert!(matches!(err, StoreError::Connection { .. }));
    }

    #[test]
    fn not_found_maps_to_query() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, StoreError::Query { .. }));
    }
}
