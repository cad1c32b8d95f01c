//! PostgreSQL-backed `CommentRepository` implementation.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::comment::Comment;
use crate::domain::ids::{CommentId, VideoId};
use crate::domain::ports::{CommentRepository, StoreError};

use super::models::CommentRow;
use super::schema::comments;
use super::{map_diesel_error, map_pool_error, DbPool};

/// Diesel-backed implementation of the `CommentRepository` port.
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn insert(&self, comment: &Comment) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(comments::table)
            .values(CommentRow::from(comment))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CommentRow> = comments::table
            .find(*id.as_uuid())
            .select(CommentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Comment::from))
    }

    async fn update_content(
        &self,
        id: CommentId,
        content: &str,
    ) -> Result<Option<Comment>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CommentRow> = diesel::update(comments::table.find(*id.as_uuid()))
            .set((
                comments::content.eq(content),
                comments::updated_at.eq(Utc::now()),
            ))
            .returning(CommentRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Comment::from))
    }

    async fn delete(&self, id: CommentId) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(comments::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn ids_for_video(&self, video: VideoId) -> Result<Vec<CommentId>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<Uuid> = comments::table
            .filter(comments::video_id.eq(*video.as_uuid()))
            .select(comments::id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(ids.into_iter().map(CommentId::from_uuid).collect())
    }

    async fn delete_for_video(&self, video: VideoId) -> Result<u64, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            comments::table.filter(comments::video_id.eq(*video.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(u64::try_from(deleted).unwrap_or(u64::MAX))
    }
}
