//! Playlist lifecycle and membership.

use std::sync::Arc;

use crate::domain::error::Error;
use crate::domain::ids::{PlaylistId, UserId, VideoId};
use crate::domain::ownership::ensure_owner;
use crate::domain::playlist::{Playlist, PlaylistChanges};
use crate::domain::ports::{PlaylistRepository, VideoRepository};
use crate::domain::read_model::views::{Page, PlaylistDetail, PlaylistSummary};
use crate::domain::read_model::{PageRequest, ReadModelComposer};
use crate::domain::validation::require_non_blank;

use super::map_store_error;

/// Creation payload after transport decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlaylist {
    pub name: String,
    pub description: String,
}

/// Playlist service.
#[derive(Clone)]
pub struct PlaylistService {
    playlists: Arc<dyn PlaylistRepository>,
    videos: Arc<dyn VideoRepository>,
    read_models: ReadModelComposer,
}

impl PlaylistService {
    /// Create the service over its ports.
    pub fn new(
        playlists: Arc<dyn PlaylistRepository>,
        videos: Arc<dyn VideoRepository>,
        read_models: ReadModelComposer,
    ) -> Self {
        Self {
            playlists,
            videos,
            read_models,
        }
    }

    /// Create a playlist owned by the actor.
    pub async fn create(&self, actor: UserId, playlist: NewPlaylist) -> Result<Playlist, Error> {
        let name = require_non_blank("name", &playlist.name)?;
        let description = require_non_blank("description", &playlist.description)?;

        let playlist = Playlist::new(actor, name, description);
        self.playlists
            .insert(&playlist)
            .await
            .map_err(map_store_error)?;

        self.playlists
            .find_by_id(playlist.id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::internal("playlist could not be confirmed"))
    }

    /// Paged playlists owned by a user, with video totals.
    pub async fn user_playlists(
        &self,
        owner: UserId,
        page: PageRequest,
    ) -> Result<Page<PlaylistSummary>, Error> {
        self.read_models.user_playlists(owner, page).await
    }

    /// Detail view with the playlist's published videos.
    pub async fn detail(&self, id: PlaylistId) -> Result<PlaylistDetail, Error> {
        self.read_models.playlist_detail(id).await
    }

    /// Owner-gated partial update.
    pub async fn update(
        &self,
        actor: UserId,
        id: PlaylistId,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Playlist, Error> {
        let changes = PlaylistChanges {
            name: name
                .as_deref()
                .map(|value| require_non_blank("name", value))
                .transpose()?,
            description: description
                .as_deref()
                .map(|value| require_non_blank("description", value))
                .transpose()?,
        };
        if changes.is_empty() {
            return Err(Error::invalid_request("at least one field is required"));
        }

        let current = self
            .playlists
            .find_by_id(id)
            .await
            .map_err(map_store_error)?;
        ensure_owner(current, actor, "playlist")?;

        self.playlists
            .update(id, &changes)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("playlist not found"))
    }

    /// Owner-gated delete. Membership rows go with the playlist.
    pub async fn delete(&self, actor: UserId, id: PlaylistId) -> Result<(), Error> {
        let current = self
            .playlists
            .find_by_id(id)
            .await
            .map_err(map_store_error)?;
        ensure_owner(current, actor, "playlist")?;

        self.playlists.delete(id).await.map_err(map_store_error)?;
        Ok(())
    }

    /// Owner-gated set-insert of a video into the playlist.
    pub async fn add_video(
        &self,
        actor: UserId,
        playlist_id: PlaylistId,
        video_id: VideoId,
    ) -> Result<Playlist, Error> {
        let current = self
            .playlists
            .find_by_id(playlist_id)
            .await
            .map_err(map_store_error)?;
        ensure_owner(current, actor, "playlist")?;

        self.videos
            .find_by_id(video_id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("video not found"))?;

        self.playlists
            .add_video(playlist_id, video_id)
            .await
            .map_err(map_store_error)?;

        self.playlists
            .find_by_id(playlist_id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("playlist not found"))
    }

    /// Owner-gated removal of a video from the playlist. Removing a video
    /// that is not a member is a no-op, mirroring the set semantics of
    /// add.
    pub async fn remove_video(
        &self,
        actor: UserId,
        playlist_id: PlaylistId,
        video_id: VideoId,
    ) -> Result<Playlist, Error> {
        let current = self
            .playlists
            .find_by_id(playlist_id)
            .await
            .map_err(map_store_error)?;
        ensure_owner(current, actor, "playlist")?;

        self.playlists
            .remove_video(playlist_id, video_id)
            .await
            .map_err(map_store_error)?;

        self.playlists
            .find_by_id(playlist_id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("playlist not found"))
    }
}
