use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::subscription;

use super::shared::Pagination;
use super::user::UserSummary;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    /// The following user.
    pub subscriber_id: Uuid,
    /// The followed user.
    pub channel_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<subscription::Model> for SubscriptionResponse {
    fn from(m: subscription::Model) -> Self {
        Self {
            subscriber_id: m.subscriber_id,
            channel_id: m.channel_id,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubscriberListResponse {
    pub subscribers: Vec<UserSummary>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ChannelListResponse {
    pub channels: Vec<UserSummary>,
    pub pagination: Pagination,
}
