//! Driving services: one per entity group.
//!
//! Services validate input, run the ownership guard where the operation
//! mutates, call the repository ports, and delegate composed reads to the
//! read-model composer.

pub mod comments;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;

pub use comments::CommentService;
pub use likes::LikeService;
pub use playlists::{NewPlaylist, PlaylistService};
pub use subscriptions::SubscriptionService;
pub use tweets::TweetService;
pub use users::{Credentials, NewAccount, UserService};
pub use videos::{NewVideo, VideoService};

use super::error::Error;
use super::ports::StoreError;

/// Translate a store failure into the domain error taxonomy.
pub(crate) fn map_store_error(error: StoreError) -> Error {
    match error {
        StoreError::Connection { message } => Error::service_unavailable(message),
        StoreError::Query { message } => Error::internal(message),
        StoreError::Duplicate { message } => Error::conflict(message),
    }
}
