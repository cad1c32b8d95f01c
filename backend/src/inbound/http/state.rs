//! Shared HTTP adapter state.
//!
//! Handlers receive this bundle via `actix_web::web::Data`, so they only
//! depend on domain services and stay testable against the in-memory
//! store.

use std::sync::Arc;

use crate::domain::ports::TokenIssuer;
use crate::domain::services::{
    CommentService, LikeService, PlaylistService, SubscriptionService, TweetService, UserService,
    VideoService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<UserService>,
    pub videos: Arc<VideoService>,
    pub comments: Arc<CommentService>,
    pub likes: Arc<LikeService>,
    pub subscriptions: Arc<SubscriptionService>,
    pub playlists: Arc<PlaylistService>,
    pub tweets: Arc<TweetService>,
    /// Used by the credential extractors.
    pub tokens: Arc<dyn TokenIssuer>,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
}
