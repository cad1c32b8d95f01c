//! Subscription join records.

use chrono::{DateTime, Utc};

use super::ids::{SubscriptionId, UserId};

/// "Subscriber follows channel"; channels are themselves users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub subscriber_id: UserId,
    pub channel_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Build a new subscription for the given pair.
    pub fn new(subscriber_id: UserId, channel_id: UserId) -> Self {
        Self {
            id: SubscriptionId::random(),
            subscriber_id,
            channel_id,
            created_at: Utc::now(),
        }
    }
}
