//! Domain core: entities, ports, services, and read models.
//!
//! Everything here is transport and store agnostic. Inbound adapters map
//! domain errors to their envelope; outbound adapters satisfy the port
//! contracts.

pub mod comment;
pub mod error;
pub mod ids;
pub mod like;
pub mod ownership;
pub mod playlist;
pub mod ports;
pub mod read_model;
pub mod services;
pub mod subscription;
pub mod tweet;
pub mod user;
pub mod validation;
pub mod video;

pub use self::comment::Comment;
pub use self::error::{Error, ErrorCode};
pub use self::ids::{
    CommentId, InvalidId, LikeId, PlaylistId, SubscriptionId, TweetId, UserId, VideoId,
};
pub use self::like::{Like, LikeTarget, LikeTargetKind};
pub use self::ownership::{ensure_owner, Owned};
pub use self::playlist::{Playlist, PlaylistChanges};
pub use self::read_model::{PageRequest, ReadModelComposer, VideoSearch};
pub use self::subscription::Subscription;
pub use self::tweet::Tweet;
pub use self::user::{AccountChanges, User};
pub use self::video::{Video, VideoChanges};
