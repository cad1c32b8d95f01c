//! Port for user persistence.

use async_trait::async_trait;

use crate::domain::ids::{UserId, VideoId};
use crate::domain::user::{AccountChanges, User};

use super::StoreError;

/// Storage contract for the users collection.
///
/// Watch history is part of the user aggregate: `record_watch` has
/// set-insert semantics, so repeat views never duplicate an entry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user. Uniqueness violations surface as
    /// [`StoreError::Duplicate`].
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    /// Fetch a user by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Fetch a user whose username or email equals the given identifier.
    async fn find_by_login(&self, identifier: &str) -> Result<Option<User>, StoreError>;

    /// Fetch a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// True when another user already holds one of the unique identity
    /// fields.
    async fn identity_taken(
        &self,
        username: &str,
        email: &str,
        full_name: &str,
    ) -> Result<bool, StoreError>;

    /// Apply a partial account update; returns the updated user, `None`
    /// when absent.
    async fn update_account(
        &self,
        id: UserId,
        changes: &AccountChanges,
    ) -> Result<Option<User>, StoreError>;

    /// Replace the avatar reference.
    async fn set_avatar(&self, id: UserId, url: &str) -> Result<Option<User>, StoreError>;

    /// Replace the cover image reference.
    async fn set_cover_image(&self, id: UserId, url: &str) -> Result<Option<User>, StoreError>;

    /// Replace the stored password hash.
    async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), StoreError>;

    /// Persist (or with `None`, unset) the current renewal credential.
    async fn set_refresh_token<'a>(
        &self,
        id: UserId,
        token: Option<&'a str>,
    ) -> Result<(), StoreError>;

    /// Set-insert a video into the user's watch history.
    async fn record_watch(&self, user: UserId, video: VideoId) -> Result<(), StoreError>;

    /// Delete the user row. Returns whether a row existed.
    async fn delete(&self, id: UserId) -> Result<bool, StoreError>;
}
