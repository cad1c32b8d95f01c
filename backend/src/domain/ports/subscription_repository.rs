//! Port for subscription persistence.

use async_trait::async_trait;

use crate::domain::ids::{SubscriptionId, UserId};
use crate::domain::subscription::Subscription;

use super::StoreError;

/// Storage contract for the subscriptions collection.
///
/// The (subscriber, channel) pair is unique; adapters enforce it and
/// report violations as [`StoreError::Duplicate`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Fetch the subscription for a (subscriber, channel) pair, if any.
    async fn find(
        &self,
        subscriber: UserId,
        channel: UserId,
    ) -> Result<Option<Subscription>, StoreError>;

    /// Persist a new subscription.
    async fn insert(&self, subscription: &Subscription) -> Result<(), StoreError>;

    /// Delete a subscription by id. Returns whether a row existed.
    async fn delete(&self, id: SubscriptionId) -> Result<bool, StoreError>;
}
