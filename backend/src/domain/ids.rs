//! Entity identifier newtypes.
//!
//! Each collection gets its own UUID-backed id type so a comment id can
//! never be passed where a video id is expected. Ids serialise as their
//! canonical string form.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::Error;

/// Raised when a path or payload carries a malformed identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {0} id")]
pub struct InvalidId(pub &'static str);

impl From<InvalidId> for Error {
    fn from(value: InvalidId) -> Self {
        Self::invalid_request(value.to_string())
    }
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $noun:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Parse the canonical string form.
            pub fn parse(value: &str) -> Result<Self, InvalidId> {
                Uuid::parse_str(value.trim())
                    .map(Self)
                    .map_err(|_| InvalidId($noun))
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

define_id!(
    /// Stable user identifier.
    UserId,
    "user"
);
define_id!(
    /// Stable video identifier.
    VideoId,
    "video"
);
define_id!(
    /// Stable comment identifier.
    CommentId,
    "comment"
);
define_id!(
    /// Stable like identifier.
    LikeId,
    "like"
);
define_id!(
    /// Stable subscription identifier.
    SubscriptionId,
    "subscription"
);
define_id!(
    /// Stable playlist identifier.
    PlaylistId,
    "playlist"
);
define_id!(
    /// Stable tweet identifier.
    TweetId,
    "tweet"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_canonical_uuids() {
        let id = VideoId::parse("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[test]
    fn parse_trims_surrounding_whitespace() {
        assert!(UserId::parse(" 3fa85f64-5717-4562-b3fc-2c963f66afa6 ").is_ok());
    }

    #[test]
    fn parse_rejects_garbage_with_the_entity_noun() {
        let err = CommentId::parse("not-a-uuid").expect_err("must fail");
        assert_eq!(err.to_string(), "invalid comment id");
    }

    #[test]
    fn ids_serialise_as_strings() {
        let id = TweetId::random();
        let json = serde_json::to_string(&id).expect("serialise");
        assert_eq!(json, format!("\"{id}\""));
    }
}
