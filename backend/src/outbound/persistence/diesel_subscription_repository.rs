//! PostgreSQL-backed `SubscriptionRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ids::{SubscriptionId, UserId};
use crate::domain::ports::{StoreError, SubscriptionRepository};
use crate::domain::subscription::Subscription;

use super::models::SubscriptionRow;
use super::schema::subscriptions;
use super::{map_diesel_error, map_pool_error, DbPool};

/// Diesel-backed implementation of the `SubscriptionRepository` port.
#[derive(Clone)]
pub struct DieselSubscriptionRepository {
    pool: DbPool,
}

impl DieselSubscriptionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for DieselSubscriptionRepository {
    async fn find(
        &self,
        subscriber: UserId,
        channel: UserId,
    ) -> Result<Option<Subscription>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<SubscriptionRow> = subscriptions::table
            .filter(
                subscriptions::subscriber_id
                    .eq(*subscriber.as_uuid())
                    .and(subscriptions::channel_id.eq(*channel.as_uuid())),
            )
            .select(SubscriptionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Subscription::from))
    }

    async fn insert(&self, subscription: &Subscription) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(subscriptions::table)
            .values(SubscriptionRow::from(subscription))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: SubscriptionId) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(subscriptions::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
