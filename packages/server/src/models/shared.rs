use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Success envelope shared by every endpoint.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// HTTP status code, repeated in the body.
    #[schema(example = 200)]
    pub status_code: u16,
    pub data: T,
    #[schema(example = "Tweet created successfully")]
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, data, message)
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CREATED, data, message)
    }

    fn with_status(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
            message: message.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Empty `{}` payload for acknowledgements such as deletes.
#[derive(Serialize, Default, utoipa::ToSchema)]
pub struct Empty {}

/// Pagination metadata included in list responses.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 10)]
    pub limit: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 5)]
    pub total_pages: u64,
}

/// `page`/`limit` query parameters for paged listings. Kept as raw strings
/// so non-numeric input can fall back to the defaults.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    /// Page number (1-indexed, default 1).
    #[param(example = "1")]
    pub page: Option<String>,
    /// Items per page (default 10).
    #[param(example = "10")]
    pub limit: Option<String>,
}

/// Trim `value` and require 1..=`max` Unicode characters.
pub fn require_text<'a>(value: &'a str, field: &str, max: usize) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value)
}

/// Validate a trimmed title (1-256 Unicode characters).
pub fn validate_title(title: &str) -> Result<&str, AppError> {
    require_text(title, "Title", 256)
}

/// Validate a trimmed description (1-5000 Unicode characters).
pub fn validate_description(description: &str) -> Result<&str, AppError> {
    require_text(description, "Description", 5000)
}
