//! Short text posts.

use chrono::{DateTime, Utc};

use super::ids::{TweetId, UserId};
use super::ownership::Owned;

/// Owned short text post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tweet {
    pub id: TweetId,
    pub owner_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tweet {
    /// Build a new tweet.
    pub fn new(owner_id: UserId, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: TweetId::random(),
            owner_id,
            content,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Owned for Tweet {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}
