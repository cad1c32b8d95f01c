//! Port for tweet persistence.

use async_trait::async_trait;

use crate::domain::ids::TweetId;
use crate::domain::tweet::Tweet;

use super::StoreError;

/// Storage contract for the tweets collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TweetRepository: Send + Sync {
    /// Persist a new tweet.
    async fn insert(&self, tweet: &Tweet) -> Result<(), StoreError>;

    /// Fetch a tweet by id.
    async fn find_by_id(&self, id: TweetId) -> Result<Option<Tweet>, StoreError>;

    /// Replace the tweet body; returns the updated tweet, `None` when
    /// absent.
    async fn update_content(&self, id: TweetId, content: &str)
        -> Result<Option<Tweet>, StoreError>;

    /// Delete the tweet row. Returns whether a row existed.
    async fn delete(&self, id: TweetId) -> Result<bool, StoreError>;
}
