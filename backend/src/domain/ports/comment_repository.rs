//! Port for comment persistence.

use async_trait::async_trait;

use crate::domain::comment::Comment;
use crate::domain::ids::{CommentId, VideoId};

use super::StoreError;

/// Storage contract for the comments collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Persist a new comment.
    async fn insert(&self, comment: &Comment) -> Result<(), StoreError>;

    /// Fetch a comment by id.
    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, StoreError>;

    /// Replace the comment body; returns the updated comment, `None` when
    /// absent.
    async fn update_content(
        &self,
        id: CommentId,
        content: &str,
    ) -> Result<Option<Comment>, StoreError>;

    /// Delete the comment row. Returns whether a row existed.
    async fn delete(&self, id: CommentId) -> Result<bool, StoreError>;

    /// Ids of every comment under the given video, for cascade fan-out.
    async fn ids_for_video(&self, video: VideoId) -> Result<Vec<CommentId>, StoreError>;

    /// Delete every comment under the given video; returns how many rows
    /// went away.
    async fn delete_for_video(&self, video: VideoId) -> Result<u64, StoreError>;
}
