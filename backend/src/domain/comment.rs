//! Comment attached to a video.

use chrono::{DateTime, Utc};

use super::ids::{CommentId, UserId, VideoId};
use super::ownership::Owned;

/// Text comment on a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub video_id: VideoId,
    pub owner_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Build a new comment.
    pub fn new(video_id: VideoId, owner_id: UserId, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: CommentId::random(),
            video_id,
            owner_id,
            content,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}
