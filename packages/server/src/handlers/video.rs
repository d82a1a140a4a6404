use axum::extract::{DefaultBodyLimit, Path, Query, State};
use chrono::Utc;
use sea_orm::*;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::entity::video;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::multipart::AppMultipart;
use crate::media::{MediaKind, discard_media, require_media_kind, upload_media};
use crate::models::shared::{ApiResponse, Empty, validate_description, validate_title};
use crate::models::video::{VideoListQuery, VideoListResponse, VideoResponse};
use crate::state::AppState;
use crate::utils::id::parse_id;
use crate::utils::listing::{Pager, VideoFilter};
use crate::utils::owner::{attach_owners, load_owner, load_owners};
use crate::utils::upload::read_form;

const VIDEO_FIELD: &str = "videoFile";
const THUMBNAIL_FIELD: &str = "thumbnail";

/// Body limit for routes carrying media: two files plus form overhead.
pub fn media_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    let limit = max_upload_size.saturating_mul(2).saturating_add(1024 * 1024);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

async fn find_video<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<video::Model, AppError> {
    video::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".into()))
}

async fn respond(
    state: &AppState,
    video: video::Model,
) -> Result<VideoResponse, AppError> {
    let owner = load_owner(&state.db, video.owner_id).await?;
    Ok(VideoResponse::new(video, owner))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Videos",
    operation_id = "listVideos",
    summary = "Discover videos",
    description = "Paged video listing. `query` matches titles case-insensitively, `userId` \
        restricts to one owner, `sortBy` is one of `createdAt` (default), `updatedAt`, `title`, \
        `duration`, and `sortType=desc` sorts descending (anything else ascending).",
    params(VideoListQuery),
    responses(
        (status = 200, description = "Page of videos", body = ApiResponse<VideoListResponse>),
        (status = 400, description = "Bad filter or paging (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_videos(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<VideoListQuery>,
) -> Result<ApiResponse<VideoListResponse>, AppError> {
    let pager = Pager::from_params(query.page.as_deref(), query.limit.as_deref())?;
    let filter = VideoFilter::from_params(
        query.query.as_deref(),
        query.user_id.as_deref(),
        query.sort_by.as_deref(),
        query.sort_type.as_deref(),
    )?;

    let select = filter.filter(video::Entity::find());
    let total = select.clone().count(&state.db).await?;

    let videos = filter
        .order(select)
        .offset(Some(pager.offset()))
        .limit(Some(pager.limit))
        .all(&state.db)
        .await?;

    let owners = load_owners(&state.db, videos.iter().map(|v| v.owner_id)).await?;
    let videos = attach_owners(videos, &owners, |v| v.owner_id, VideoResponse::new)?;

    Ok(ApiResponse::ok(
        VideoListResponse {
            videos,
            pagination: pager.pagination(total),
        },
        "Videos fetched successfully",
    ))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Videos",
    operation_id = "publishVideo",
    summary = "Publish a video",
    description = "Multipart form with `title`, `description`, `videoFile` (a video file) and \
        `thumbnail` (an image). Both files are uploaded before the record is created; if a \
        later step fails the uploaded objects are removed again.",
    request_body(content_type = "multipart/form-data", description = "title, description, videoFile, thumbnail"),
    responses(
        (status = 201, description = "Video published", body = ApiResponse<VideoResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 500, description = "Upload failed (INTERNAL_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.user_id))]
pub async fn publish_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppMultipart(mut multipart): AppMultipart,
) -> Result<ApiResponse<VideoResponse>, AppError> {
    let mut form = read_form(
        &mut multipart,
        &[VIDEO_FIELD, THUMBNAIL_FIELD],
        state.config.storage.max_upload_size,
    )
    .await?;

    let title = validate_title(form.text("title").unwrap_or_default())?.to_string();
    let description =
        validate_description(form.text("description").unwrap_or_default())?.to_string();

    let (Some(video_file), Some(thumbnail)) =
        (form.take_file(VIDEO_FIELD), form.take_file(THUMBNAIL_FIELD))
    else {
        return Err(AppError::Validation(
            "Video file and thumbnail are required".into(),
        ));
    };
    require_media_kind(&video_file.file_name, MediaKind::Video, VIDEO_FIELD)?;
    require_media_kind(&thumbnail.file_name, MediaKind::Image, THUMBNAIL_FIELD)?;

    let media = state.media.as_ref();
    let stored_video = upload_media(media, &video_file).await?;
    let stored_thumbnail = match upload_media(media, &thumbnail).await {
        Ok(stored) => stored,
        Err(e) => {
            discard_media(media, &stored_video.url).await;
            return Err(e);
        }
    };

    if stored_video.duration.is_none() {
        warn!(url = %stored_video.url, "Video duration could not be determined; storing null");
    }

    let now = Utc::now();
    let new_video = video::ActiveModel {
        id: Set(Uuid::now_v7()),
        video_file: Set(stored_video.url.clone()),
        thumbnail: Set(stored_thumbnail.url.clone()),
        title: Set(title),
        description: Set(description),
        duration: Set(stored_video.duration),
        is_published: Set(true),
        owner_id: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let inserted = match new_video.insert(&state.db).await {
        Ok(model) => model,
        Err(e) => {
            discard_media(media, &stored_video.url).await;
            discard_media(media, &stored_thumbnail.url).await;
            return Err(e.into());
        }
    };

    let video = video::Entity::find_by_id(inserted.id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!("Video {} missing right after insert", inserted.id))
        })?;

    Ok(ApiResponse::created(
        respond(&state, video).await?,
        "Video published successfully",
    ))
}

#[utoipa::path(
    get,
    path = "/{video_id}",
    tag = "Videos",
    operation_id = "getVideo",
    summary = "Get a video by ID",
    params(("video_id" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video", body = ApiResponse<VideoResponse>),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(video_id = %video_id))]
pub async fn get_video(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<VideoResponse>, AppError> {
    let id = parse_id(&video_id, "video")?;
    let video = find_video(&state.db, id).await?;

    Ok(ApiResponse::ok(
        respond(&state, video).await?,
        "Video fetched successfully",
    ))
}

#[utoipa::path(
    patch,
    path = "/{video_id}",
    tag = "Videos",
    operation_id = "updateVideo",
    summary = "Edit video metadata",
    description = "Multipart form with optional `title`, `description` and `thumbnail`. A new \
        thumbnail is uploaded first, then the record is switched to it, and only then is the \
        previous thumbnail deleted.",
    params(("video_id" = String, Path, description = "Video ID")),
    request_body(content_type = "multipart/form-data", description = "title?, description?, thumbnail?"),
    responses(
        (status = 200, description = "Video updated", body = ApiResponse<VideoResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Upload failed (INTERNAL_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(video_id = %video_id, user_id = %auth_user.user_id))]
pub async fn update_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    AppMultipart(mut multipart): AppMultipart,
) -> Result<ApiResponse<VideoResponse>, AppError> {
    let id = parse_id(&video_id, "video")?;
    let video = find_video(&state.db, id).await?;
    auth_user.require_owner(video.owner_id, "update this video")?;

    let mut form = read_form(
        &mut multipart,
        &[THUMBNAIL_FIELD],
        state.config.storage.max_upload_size,
    )
    .await?;

    let title = form
        .text("title")
        .map(validate_title)
        .transpose()?
        .map(str::to_owned);
    let description = form
        .text("description")
        .map(validate_description)
        .transpose()?
        .map(str::to_owned);
    let new_thumbnail = form.take_file(THUMBNAIL_FIELD);
    if let Some(ref file) = new_thumbnail {
        require_media_kind(&file.file_name, MediaKind::Image, THUMBNAIL_FIELD)?;
    }

    let media = state.media.as_ref();
    // Stage: the record and the old object are untouched if this fails.
    let staged = match new_thumbnail {
        Some(ref file) => Some(upload_media(media, file).await?),
        None => None,
    };

    let old_thumbnail = video.thumbnail.clone();
    let mut active: video::ActiveModel = video.into();
    if let Some(title) = title {
        active.title = Set(title);
    }
    if let Some(description) = description {
        active.description = Set(description);
    }
    if let Some(ref stored) = staged {
        active.thumbnail = Set(stored.url.clone());
    }
    active.updated_at = Set(Utc::now());

    // Confirm.
    let updated = match active.update(&state.db).await {
        Ok(model) => model,
        Err(e) => {
            if let Some(ref stored) = staged {
                discard_media(media, &stored.url).await;
            }
            return Err(e.into());
        }
    };

    // Retire.
    if staged.is_some() {
        discard_media(media, &old_thumbnail).await;
    }

    Ok(ApiResponse::ok(
        respond(&state, updated).await?,
        "Video updated successfully",
    ))
}

#[utoipa::path(
    delete,
    path = "/{video_id}",
    tag = "Videos",
    operation_id = "deleteVideo",
    summary = "Delete a video",
    description = "Removes the record and both stored objects. The row removal is rolled back \
        if either object cannot be deleted; deleting an already missing object succeeds, so a \
        retry converges.",
    params(("video_id" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video deleted", body = ApiResponse<Empty>),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(video_id = %video_id, user_id = %auth_user.user_id))]
pub async fn delete_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<Empty>, AppError> {
    let id = parse_id(&video_id, "video")?;
    let video = find_video(&state.db, id).await?;
    auth_user.require_owner(video.owner_id, "delete this video")?;

    let txn = state.db.begin().await?;
    video::Entity::delete_by_id(id).exec(&txn).await?;
    state.media.delete(&video.video_file).await?;
    state.media.delete(&video.thumbnail).await?;
    txn.commit().await?;

    Ok(ApiResponse::ok(Empty {}, "Video deleted successfully"))
}

#[utoipa::path(
    patch,
    path = "/{video_id}/publish",
    tag = "Videos",
    operation_id = "togglePublishStatus",
    summary = "Toggle a video's published flag",
    params(("video_id" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Flag toggled", body = ApiResponse<VideoResponse>),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(video_id = %video_id, user_id = %auth_user.user_id))]
pub async fn toggle_publish(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<VideoResponse>, AppError> {
    let id = parse_id(&video_id, "video")?;
    let video = find_video(&state.db, id).await?;
    auth_user.require_owner(video.owner_id, "change this video's publish status")?;

    let published = !video.is_published;
    let mut active: video::ActiveModel = video.into();
    active.is_published = Set(published);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(ApiResponse::ok(
        respond(&state, updated).await?,
        "Video publish status toggled successfully",
    ))
}
