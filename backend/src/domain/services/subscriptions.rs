//! Subscription toggling and channel listings.

use std::sync::Arc;

use crate::domain::error::Error;
use crate::domain::ids::UserId;
use crate::domain::ports::{StoreError, SubscriptionRepository, UserRepository};
use crate::domain::read_model::views::{Page, SubscribedChannelView, SubscriberView};
use crate::domain::read_model::{PageRequest, ReadModelComposer};
use crate::domain::subscription::Subscription;

use super::map_store_error;

/// Subscription service.
#[derive(Clone)]
pub struct SubscriptionService {
    subscriptions: Arc<dyn SubscriptionRepository>,
    users: Arc<dyn UserRepository>,
    read_models: ReadModelComposer,
}

impl SubscriptionService {
    /// Create the service over its ports.
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        users: Arc<dyn UserRepository>,
        read_models: ReadModelComposer,
    ) -> Self {
        Self {
            subscriptions,
            users,
            read_models,
        }
    }

    /// Toggle the actor's subscription to the channel. Returns the new
    /// subscribed state.
    pub async fn toggle(&self, actor: UserId, channel: UserId) -> Result<bool, Error> {
        self.users
            .find_by_id(channel)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("channel not found"))?;

        let existing = self
            .subscriptions
            .find(actor, channel)
            .await
            .map_err(map_store_error)?;
        match existing {
            Some(subscription) => {
                self.subscriptions
                    .delete(subscription.id)
                    .await
                    .map_err(map_store_error)?;
                Ok(false)
            }
            None => {
                let subscription = Subscription::new(actor, channel);
                match self.subscriptions.insert(&subscription).await {
                    Ok(()) => Ok(true),
                    // A concurrent toggle won the insert; the pair is
                    // subscribed either way.
                    Err(StoreError::Duplicate { .. }) => Ok(true),
                    Err(error) => Err(map_store_error(error)),
                }
            }
        }
    }

    /// Paged subscribers of a channel.
    pub async fn channel_subscribers(
        &self,
        channel: UserId,
        actor: Option<UserId>,
        page: PageRequest,
    ) -> Result<Page<SubscriberView>, Error> {
        self.read_models
            .channel_subscribers(channel, actor, page)
            .await
    }

    /// Paged channels the user subscribes to.
    pub async fn subscribed_channels(
        &self,
        subscriber: UserId,
        page: PageRequest,
    ) -> Result<Page<SubscribedChannelView>, Error> {
        self.read_models.subscribed_channels(subscriber, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::{
        MockReadModelExecutor, MockSubscriptionRepository, MockUserRepository,
    };
    use crate::domain::user::User;

    fn service(
        subscriptions: MockSubscriptionRepository,
        users: MockUserRepository,
    ) -> SubscriptionService {
        SubscriptionService::new(
            Arc::new(subscriptions),
            Arc::new(users),
            ReadModelComposer::new(Arc::new(MockReadModelExecutor::new())),
        )
    }

    fn existing_channel() -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            let mut user = User::new(
                "chan".into(),
                "chan@example.com".into(),
                "channel".into(),
                "hash".into(),
                "avatar".into(),
                None,
            );
            user.id = id;
            Ok(Some(user))
        });
        users
    }

    #[tokio::test]
    async fn toggle_subscribes_when_no_pair_exists() {
        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions.expect_find().returning(|_, _| Ok(None));
        subscriptions.expect_insert().times(1).returning(|_| Ok(()));
        subscriptions.expect_delete().times(0);

        let subscribed = service(subscriptions, existing_channel())
            .toggle(UserId::random(), UserId::random())
            .await
            .expect("toggled");
        assert!(subscribed);
    }

    #[tokio::test]
    async fn toggle_unsubscribes_when_the_pair_exists() {
        let actor = UserId::random();
        let channel = UserId::random();
        let subscription = Subscription::new(actor, channel);
        let subscription_id = subscription.id;

        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions
            .expect_find()
            .return_once(move |_, _| Ok(Some(subscription)));
        subscriptions
            .expect_delete()
            .withf(move |id| *id == subscription_id)
            .times(1)
            .returning(|_| Ok(true));
        subscriptions.expect_insert().times(0);

        let subscribed = service(subscriptions, existing_channel())
            .toggle(actor, channel)
            .await
            .expect("toggled");
        assert!(!subscribed);
    }

    #[tokio::test]
    async fn toggle_on_a_missing_channel_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let err = service(MockSubscriptionRepository::new(), users)
            .toggle(UserId::random(), UserId::random())
            .await
            .expect_err("missing channel");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
