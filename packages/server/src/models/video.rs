use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::video;

use super::shared::Pagination;
use super::user::UserSummary;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: Uuid,
    /// Public URL of the video object.
    pub video_file: String,
    /// Public URL of the thumbnail object.
    pub thumbnail: String,
    #[schema(example = "Cats in boxes")]
    pub title: String,
    pub description: String,
    /// Seconds; null when it could not be determined at upload.
    #[schema(example = 30.0)]
    pub duration: Option<f64>,
    pub is_published: bool,
    pub owner: UserSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoResponse {
    pub fn new(video: video::Model, owner: UserSummary) -> Self {
        Self {
            id: video.id,
            video_file: video.video_file,
            thumbnail: video.thumbnail,
            title: video.title,
            description: video.description,
            duration: video.duration,
            is_published: video.is_published,
            owner,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VideoListResponse {
    pub videos: Vec<VideoResponse>,
    pub pagination: Pagination,
}

/// Query parameters for video discovery. Values are kept raw so the pager can
/// apply its own fallback rules.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase")]
pub struct VideoListQuery {
    /// Page number (1-indexed, default 1).
    #[param(example = "1")]
    pub page: Option<String>,
    /// Items per page (default 10).
    #[param(example = "10")]
    pub limit: Option<String>,
    /// Case-insensitive title search.
    #[param(example = "cats")]
    pub query: Option<String>,
    /// One of `createdAt`, `updatedAt`, `title`, `duration`.
    #[param(example = "createdAt")]
    pub sort_by: Option<String>,
    /// `desc` for descending; anything else sorts ascending.
    #[param(example = "desc")]
    pub sort_type: Option<String>,
    /// Restrict to videos owned by this user.
    pub user_id: Option<String>,
}
