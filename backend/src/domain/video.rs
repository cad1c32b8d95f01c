//! Owned media record.

use chrono::{DateTime, Utc};

use super::ids::{UserId, VideoId};
use super::ownership::Owned;

/// Published (or draft) video.
#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub id: VideoId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration_secs: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    /// Build a freshly uploaded video. Uploads start unpublished.
    pub fn new(
        owner_id: UserId,
        title: String,
        description: String,
        video_url: String,
        thumbnail_url: String,
        duration_secs: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: VideoId::random(),
            owner_id,
            title,
            description,
            video_url,
            thumbnail_url,
            duration_secs,
            views: 0,
            is_published: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Owned for Video {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

/// Partial video update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl VideoChanges {
    /// True when no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.thumbnail_url.is_none()
    }
}
