//! PostgreSQL-backed `PlaylistRepository` implementation.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ids::{PlaylistId, VideoId};
use crate::domain::playlist::{Playlist, PlaylistChanges};
use crate::domain::ports::{PlaylistRepository, StoreError};

use super::models::{PlaylistChangeset, PlaylistRow, PlaylistVideoRow};
use super::schema::{playlist_videos, playlists};
use super::{map_diesel_error, map_pool_error, DbPool};

/// Diesel-backed implementation of the `PlaylistRepository` port.
#[derive(Clone)]
pub struct DieselPlaylistRepository {
    pool: DbPool,
}

impl DieselPlaylistRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaylistRepository for DieselPlaylistRepository {
    async fn insert(&self, playlist: &Playlist) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(playlists::table)
            .values(PlaylistRow::from(playlist))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: PlaylistId) -> Result<Option<Playlist>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PlaylistRow> = playlists::table
            .find(*id.as_uuid())
            .select(PlaylistRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Playlist::from))
    }

    async fn update(
        &self,
        id: PlaylistId,
        changes: &PlaylistChanges,
    ) -> Result<Option<Playlist>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = PlaylistChangeset {
            name: changes.name.as_deref(),
            description: changes.description.as_deref(),
            updated_at: Utc::now(),
        };
        let row: Option<PlaylistRow> = diesel::update(playlists::table.find(*id.as_uuid()))
            .set(&changeset)
            .returning(PlaylistRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Playlist::from))
    }

    async fn delete(&self, id: PlaylistId) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(
            playlist_videos::table.filter(playlist_videos::playlist_id.eq(*id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        let deleted = diesel::delete(playlists::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn add_video(&self, playlist: PlaylistId, video: VideoId) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = PlaylistVideoRow {
            playlist_id: *playlist.as_uuid(),
            video_id: *video.as_uuid(),
            added_at: Utc::now(),
        };
        diesel::insert_into(playlist_videos::table)
            .values(&row)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn remove_video(
        &self,
        playlist: PlaylistId,
        video: VideoId,
    ) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            playlist_videos::table.filter(
                playlist_videos::playlist_id
                    .eq(*playlist.as_uuid())
                    .and(playlist_videos::video_id.eq(*video.as_uuid())),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
