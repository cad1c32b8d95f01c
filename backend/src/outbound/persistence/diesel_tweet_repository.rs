//! PostgreSQL-backed `TweetRepository` implementation.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ids::TweetId;
use crate::domain::ports::{StoreError, TweetRepository};
use crate::domain::tweet::Tweet;

use super::models::TweetRow;
use super::schema::tweets;
use super::{map_diesel_error, map_pool_error, DbPool};

/// Diesel-backed implementation of the `TweetRepository` port.
#[derive(Clone)]
pub struct DieselTweetRepository {
    pool: DbPool,
}

impl DieselTweetRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TweetRepository for DieselTweetRepository {
    async fn insert(&self, tweet: &Tweet) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(tweets::table)
            .values(TweetRow::from(tweet))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: TweetId) -> Result<Option<Tweet>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TweetRow> = tweets::table
            .find(*id.as_uuid())
            .select(TweetRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Tweet::from))
    }

    async fn update_content(
        &self,
        id: TweetId,
        content: &str,
    ) -> Result<Option<Tweet>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TweetRow> = diesel::update(tweets::table.find(*id.as_uuid()))
            .set((
                tweets::content.eq(content),
                tweets::updated_at.eq(Utc::now()),
            ))
            .returning(TweetRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Tweet::from))
    }

    async fn delete(&self, id: TweetId) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(tweets::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
