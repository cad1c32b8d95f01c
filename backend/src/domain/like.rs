//! Like join records.
//!
//! A like references exactly one target. The target is a tagged union, so
//! a row with zero or several targets cannot be represented at all.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::ids::{CommentId, LikeId, TweetId, UserId, VideoId};

/// Discriminant of a like target, used by stores to key the join rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LikeTargetKind {
    Video,
    Comment,
    Tweet,
}

impl LikeTargetKind {
    /// Stable storage token for the discriminant.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Comment => "comment",
            Self::Tweet => "tweet",
        }
    }

    /// Parse a storage token back into a discriminant.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "video" => Some(Self::Video),
            "comment" => Some(Self::Comment),
            "tweet" => Some(Self::Tweet),
            _ => None,
        }
    }
}

impl std::fmt::Display for LikeTargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The one entity a like points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LikeTarget {
    Video(VideoId),
    Comment(CommentId),
    Tweet(TweetId),
}

impl LikeTarget {
    /// Discriminant of this target.
    pub fn kind(&self) -> LikeTargetKind {
        match self {
            Self::Video(_) => LikeTargetKind::Video,
            Self::Comment(_) => LikeTargetKind::Comment,
            Self::Tweet(_) => LikeTargetKind::Tweet,
        }
    }

    /// Raw UUID of the referenced entity.
    pub fn target_uuid(&self) -> Uuid {
        match self {
            Self::Video(id) => *id.as_uuid(),
            Self::Comment(id) => *id.as_uuid(),
            Self::Tweet(id) => *id.as_uuid(),
        }
    }

    /// Reassemble a target from its stored (kind, id) pair.
    pub fn from_parts(kind: LikeTargetKind, id: Uuid) -> Self {
        match kind {
            LikeTargetKind::Video => Self::Video(VideoId::from_uuid(id)),
            LikeTargetKind::Comment => Self::Comment(CommentId::from_uuid(id)),
            LikeTargetKind::Tweet => Self::Tweet(TweetId::from_uuid(id)),
        }
    }
}

/// "User X liked target Y". Existence is the whole signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Like {
    pub id: LikeId,
    pub liked_by: UserId,
    pub target: LikeTarget,
    pub created_at: DateTime<Utc>,
}

impl Like {
    /// Build a new like for the given actor and target.
    pub fn new(liked_by: UserId, target: LikeTarget) -> Self {
        Self {
            id: LikeId::random(),
            liked_by,
            target,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tokens_round_trip() {
        for kind in [
            LikeTargetKind::Video,
            LikeTargetKind::Comment,
            LikeTargetKind::Tweet,
        ] {
            assert_eq!(LikeTargetKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(LikeTargetKind::parse("playlist"), None);
    }

    #[test]
    fn targets_round_trip_through_parts() {
        let target = LikeTarget::Comment(CommentId::random());
        let rebuilt = LikeTarget::from_parts(target.kind(), target.target_uuid());
        assert_eq!(rebuilt, target);
    }
}
