//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod comments;
pub mod envelope;
pub mod health;
pub mod likes;
pub mod pagination;
pub mod playlists;
pub mod state;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;

pub use envelope::{ApiError, ApiResult};
pub use state::HttpState;
