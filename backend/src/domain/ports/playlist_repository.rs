//! Port for playlist persistence.

use async_trait::async_trait;

use crate::domain::ids::{PlaylistId, VideoId};
use crate::domain::playlist::{Playlist, PlaylistChanges};

use super::StoreError;

/// Storage contract for the playlists collection and its membership rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    /// Persist a new playlist.
    async fn insert(&self, playlist: &Playlist) -> Result<(), StoreError>;

    /// Fetch a playlist by id.
    async fn find_by_id(&self, id: PlaylistId) -> Result<Option<Playlist>, StoreError>;

    /// Apply a partial update; returns the updated playlist, `None` when
    /// absent.
    async fn update(
        &self,
        id: PlaylistId,
        changes: &PlaylistChanges,
    ) -> Result<Option<Playlist>, StoreError>;

    /// Delete the playlist and its membership rows. Returns whether the
    /// playlist existed.
    async fn delete(&self, id: PlaylistId) -> Result<bool, StoreError>;

    /// Set-insert a video into the playlist; duplicates are suppressed.
    async fn add_video(&self, playlist: PlaylistId, video: VideoId) -> Result<(), StoreError>;

    /// Remove a video from the playlist. Returns whether a membership row
    /// existed.
    async fn remove_video(&self, playlist: PlaylistId, video: VideoId)
        -> Result<bool, StoreError>;
}
