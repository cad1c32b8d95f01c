//! Port for like persistence.

use async_trait::async_trait;

use crate::domain::ids::{LikeId, UserId};
use crate::domain::like::{Like, LikeTarget};

use super::StoreError;

/// Storage contract for the likes collection.
///
/// The (actor, target) pair is unique; adapters enforce it and report
/// violations as [`StoreError::Duplicate`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Fetch the like for an (actor, target) pair, if any.
    async fn find(&self, actor: UserId, target: &LikeTarget)
        -> Result<Option<Like>, StoreError>;

    /// Persist a new like.
    async fn insert(&self, like: &Like) -> Result<(), StoreError>;

    /// Delete a like by id. Returns whether a row existed.
    async fn delete(&self, id: LikeId) -> Result<bool, StoreError>;

    /// Delete every like pointing at the target, regardless of actor;
    /// returns how many rows went away. Used by cascade deletes.
    async fn delete_for_target(&self, target: &LikeTarget) -> Result<u64, StoreError>;
}
