//! Port for video persistence.

use async_trait::async_trait;

use crate::domain::ids::VideoId;
use crate::domain::video::{Video, VideoChanges};

use super::StoreError;

/// Storage contract for the videos collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Persist a new video.
    async fn insert(&self, video: &Video) -> Result<(), StoreError>;

    /// Fetch a video by id.
    async fn find_by_id(&self, id: VideoId) -> Result<Option<Video>, StoreError>;

    /// Apply a partial update; returns the updated video, `None` when
    /// absent.
    async fn update(&self, id: VideoId, changes: &VideoChanges)
        -> Result<Option<Video>, StoreError>;

    /// Flip the published flag to the given value.
    async fn set_published(&self, id: VideoId, published: bool)
        -> Result<Option<Video>, StoreError>;

    /// Unconditionally add one view.
    async fn increment_views(&self, id: VideoId) -> Result<(), StoreError>;

    /// Delete the video row. Returns whether a row existed.
    async fn delete(&self, id: VideoId) -> Result<bool, StoreError>;
}
