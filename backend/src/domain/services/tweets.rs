//! Tweet lifecycle.

use std::sync::Arc;

use tracing::warn;

use crate::domain::error::Error;
use crate::domain::ids::{TweetId, UserId};
use crate::domain::like::LikeTarget;
use crate::domain::ownership::ensure_owner;
use crate::domain::ports::{LikeRepository, TweetRepository};
use crate::domain::read_model::views::{Page, TweetView};
use crate::domain::read_model::{PageRequest, ReadModelComposer};
use crate::domain::tweet::Tweet;
use crate::domain::validation::require_non_blank;

use super::map_store_error;

/// Tweet service.
#[derive(Clone)]
pub struct TweetService {
    tweets: Arc<dyn TweetRepository>,
    likes: Arc<dyn LikeRepository>,
    read_models: ReadModelComposer,
}

impl TweetService {
    /// Create the service over its ports.
    pub fn new(
        tweets: Arc<dyn TweetRepository>,
        likes: Arc<dyn LikeRepository>,
        read_models: ReadModelComposer,
    ) -> Self {
        Self {
            tweets,
            likes,
            read_models,
        }
    }

    /// Create a tweet owned by the actor.
    pub async fn create(&self, actor: UserId, content: &str) -> Result<Tweet, Error> {
        let content = require_non_blank("content", content)?;

        let tweet = Tweet::new(actor, content);
        self.tweets.insert(&tweet).await.map_err(map_store_error)?;

        self.tweets
            .find_by_id(tweet.id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::internal("tweet could not be confirmed"))
    }

    /// Paged tweets by a user, relative to the actor.
    pub async fn user_tweets(
        &self,
        user: UserId,
        actor: Option<UserId>,
        page: PageRequest,
    ) -> Result<Page<TweetView>, Error> {
        self.read_models.tweets_by_user(user, actor, page).await
    }

    /// Owner-gated body edit.
    pub async fn update(&self, actor: UserId, id: TweetId, content: &str) -> Result<Tweet, Error> {
        let content = require_non_blank("content", content)?;
        let current = self.tweets.find_by_id(id).await.map_err(map_store_error)?;
        ensure_owner(current, actor, "tweet")?;

        self.tweets
            .update_content(id, &content)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("tweet not found"))
    }

    /// Owner-gated delete; the tweet's likes are cascaded best-effort.
    pub async fn delete(&self, actor: UserId, id: TweetId) -> Result<(), Error> {
        let current = self.tweets.find_by_id(id).await.map_err(map_store_error)?;
        ensure_owner(current, actor, "tweet")?;

        self.tweets.delete(id).await.map_err(map_store_error)?;
        if let Err(error) = self.likes.delete_for_target(&LikeTarget::Tweet(id)).await {
            warn!(tweet = %id, %error, "cascade of tweet likes failed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::{
        MockLikeRepository, MockReadModelExecutor, MockTweetRepository,
    };

    fn service(tweets: MockTweetRepository, likes: MockLikeRepository) -> TweetService {
        TweetService::new(
            Arc::new(tweets),
            Arc::new(likes),
            ReadModelComposer::new(Arc::new(MockReadModelExecutor::new())),
        )
    }

    #[tokio::test]
    async fn create_trims_and_persists_the_content() {
        let mut tweets = MockTweetRepository::new();
        tweets
            .expect_insert()
            .withf(|tweet: &Tweet| tweet.content == "hello")
            .times(1)
            .returning(|_| Ok(()));
        tweets.expect_find_by_id().times(1).returning(|id| {
            let mut tweet = Tweet::new(UserId::random(), "hello".into());
            tweet.id = id;
            Ok(Some(tweet))
        });

        let tweet = service(tweets, MockLikeRepository::new())
            .create(UserId::random(), "  hello  ")
            .await
            .expect("created");
        assert_eq!(tweet.content, "hello");
    }

    #[tokio::test]
    async fn update_by_a_non_owner_is_forbidden() {
        let mut tweets = MockTweetRepository::new();
        tweets.expect_find_by_id().returning(|id| {
            let mut tweet = Tweet::new(UserId::random(), "mine".into());
            tweet.id = id;
            Ok(Some(tweet))
        });
        tweets.expect_update_content().times(0);

        let err = service(tweets, MockLikeRepository::new())
            .update(UserId::random(), TweetId::random(), "stolen")
            .await
            .expect_err("foreign tweet");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn delete_cascades_the_tweet_likes() {
        let actor = UserId::random();
        let id = TweetId::random();
        let mut tweets = MockTweetRepository::new();
        tweets.expect_find_by_id().returning(move |tid| {
            let mut tweet = Tweet::new(actor, "bye".into());
            tweet.id = tid;
            Ok(Some(tweet))
        });
        tweets.expect_delete().times(1).returning(|_| Ok(true));

        let mut likes = MockLikeRepository::new();
        likes
            .expect_delete_for_target()
            .withf(move |target| *target == LikeTarget::Tweet(id))
            .times(1)
            .returning(|_| Ok(0));

        service(tweets, likes).delete(actor, id).await.expect("deleted");
    }
}
