use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::tweet;
use crate::error::AppError;

use super::shared::{Pagination, require_text};
use super::user::UserSummary;

pub const MAX_TWEET_LENGTH: usize = 280;

/// Request body for creating or editing a tweet.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct TweetRequest {
    /// Tweet text (1-280 characters after trimming).
    #[schema(example = "First upload is live!")]
    pub content: Option<String>,
}

impl TweetRequest {
    /// Trimmed, length-checked content.
    pub fn content(&self) -> Result<String, AppError> {
        let raw = self
            .content
            .as_deref()
            .ok_or_else(|| AppError::Validation("Content is required".into()))?;
        require_text(raw, "Content", MAX_TWEET_LENGTH).map(str::to_owned)
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TweetResponse {
    pub id: Uuid,
    #[schema(example = "First upload is live!")]
    pub content: String,
    pub owner: UserSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TweetResponse {
    pub fn new(tweet: tweet::Model, owner: UserSummary) -> Self {
        Self {
            id: tweet.id,
            content: tweet.content,
            owner,
            created_at: tweet.created_at,
            updated_at: tweet.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TweetListResponse {
    pub tweets: Vec<TweetResponse>,
    pub pagination: Pagination,
}
