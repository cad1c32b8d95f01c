//! Named video collections.

use chrono::{DateTime, Utc};

use super::ids::{PlaylistId, UserId};
use super::ownership::Owned;

/// Owned, named collection of videos. Membership lives in its own join
/// rows; duplicates are suppressed on add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: PlaylistId,
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    /// Build a new, empty playlist.
    pub fn new(owner_id: UserId, name: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: PlaylistId::random(),
            owner_id,
            name,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Owned for Playlist {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

/// Partial playlist update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl PlaylistChanges {
    /// True when no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}
