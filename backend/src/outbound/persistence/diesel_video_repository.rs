//! PostgreSQL-backed `VideoRepository` implementation.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ids::VideoId;
use crate::domain::ports::{StoreError, VideoRepository};
use crate::domain::video::{Video, VideoChanges};

use super::models::{VideoChangeset, VideoRow};
use super::schema::videos;
use super::{map_diesel_error, map_pool_error, DbPool};

/// Diesel-backed implementation of the `VideoRepository` port.
#[derive(Clone)]
pub struct DieselVideoRepository {
    pool: DbPool,
}

impl DieselVideoRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for DieselVideoRepository {
    async fn insert(&self, video: &Video) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(videos::table)
            .values(VideoRow::from(video))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: VideoId) -> Result<Option<Video>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<VideoRow> = videos::table
            .find(*id.as_uuid())
            .select(VideoRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Video::from))
    }

    async fn update(
        &self,
        id: VideoId,
        changes: &VideoChanges,
    ) -> Result<Option<Video>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = VideoChangeset {
            title: changes.title.as_deref(),
            description: changes.description.as_deref(),
            thumbnail_url: changes.thumbnail_url.as_deref(),
            updated_at: Utc::now(),
        };
        let row: Option<VideoRow> = diesel::update(videos::table.find(*id.as_uuid()))
            .set(&changeset)
            .returning(VideoRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Video::from))
    }

    async fn set_published(
        &self,
        id: VideoId,
        published: bool,
    ) -> Result<Option<Video>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<VideoRow> = diesel::update(videos::table.find(*id.as_uuid()))
            .set((
                videos::is_published.eq(published),
                videos::updated_at.eq(Utc::now()),
            ))
            .returning(VideoRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Video::from))
    }

    async fn increment_views(&self, id: VideoId) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(videos::table.find(*id.as_uuid()))
            .set(videos::views.eq(videos::views + 1))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: VideoId) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(videos::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
