use axum::extract::{Path, Query, State};
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{tweet, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{ApiResponse, Empty, PageQuery};
use crate::models::tweet::{TweetListResponse, TweetRequest, TweetResponse};
use crate::models::user::UserSummary;
use crate::state::AppState;
use crate::utils::id::parse_id;
use crate::utils::listing::Pager;
use crate::utils::owner::load_owner;

async fn find_tweet<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<tweet::Model, AppError> {
    tweet::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tweet not found".into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Tweets",
    operation_id = "createTweet",
    summary = "Post a tweet",
    request_body = TweetRequest,
    responses(
        (status = 201, description = "Tweet created", body = ApiResponse<TweetResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn create_tweet(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<TweetRequest>,
) -> Result<ApiResponse<TweetResponse>, AppError> {
    let content = payload.content()?;

    let now = Utc::now();
    let new_tweet = tweet::ActiveModel {
        id: Set(Uuid::now_v7()),
        content: Set(content),
        owner_id: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let inserted = new_tweet.insert(&state.db).await?;

    let tweet = tweet::Entity::find_by_id(inserted.id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!("Tweet {} missing right after insert", inserted.id))
        })?;
    let owner = load_owner(&state.db, tweet.owner_id).await?;

    Ok(ApiResponse::created(
        TweetResponse::new(tweet, owner),
        "Tweet created successfully",
    ))
}

#[utoipa::path(
    get,
    path = "/{tweet_id}",
    tag = "Tweets",
    operation_id = "getTweet",
    summary = "Get a tweet by ID",
    params(("tweet_id" = String, Path, description = "Tweet ID")),
    responses(
        (status = 200, description = "Tweet", body = ApiResponse<TweetResponse>),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Tweet not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(tweet_id = %tweet_id))]
pub async fn get_tweet(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(tweet_id): Path<String>,
) -> Result<ApiResponse<TweetResponse>, AppError> {
    let id = parse_id(&tweet_id, "tweet")?;
    let tweet = find_tweet(&state.db, id).await?;
    let owner = load_owner(&state.db, tweet.owner_id).await?;

    Ok(ApiResponse::ok(
        TweetResponse::new(tweet, owner),
        "Tweet fetched successfully",
    ))
}

#[utoipa::path(
    get,
    path = "/user/{user_id}",
    tag = "Tweets",
    operation_id = "listUserTweets",
    summary = "List a user's tweets",
    description = "Newest first. `page` and `limit` default to 1 and 10; non-numeric values \
        fall back to the defaults and non-positive ones are rejected.",
    params(("user_id" = String, Path, description = "Author's user ID"), PageQuery),
    responses(
        (status = 200, description = "Page of tweets", body = ApiResponse<TweetListResponse>),
        (status = 400, description = "Malformed ID or paging (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query), fields(user_id = %user_id))]
pub async fn list_user_tweets(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<ApiResponse<TweetListResponse>, AppError> {
    let user_id = parse_id(&user_id, "user")?;
    let pager = Pager::from_params(query.page.as_deref(), query.limit.as_deref())?;

    let author = user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    let owner = UserSummary::from(author);

    let select = tweet::Entity::find().filter(tweet::Column::OwnerId.eq(user_id));
    let total = select.clone().count(&state.db).await?;

    let tweets = select
        .order_by_desc(tweet::Column::CreatedAt)
        .order_by_desc(tweet::Column::Id)
        .offset(Some(pager.offset()))
        .limit(Some(pager.limit))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|t| TweetResponse::new(t, owner.clone()))
        .collect();

    Ok(ApiResponse::ok(
        TweetListResponse {
            tweets,
            pagination: pager.pagination(total),
        },
        "User tweets fetched successfully",
    ))
}

#[utoipa::path(
    patch,
    path = "/{tweet_id}",
    tag = "Tweets",
    operation_id = "updateTweet",
    summary = "Edit a tweet",
    description = "Only the author may edit. Replaces the content and bumps `updatedAt`.",
    params(("tweet_id" = String, Path, description = "Tweet ID")),
    request_body = TweetRequest,
    responses(
        (status = 200, description = "Tweet updated", body = ApiResponse<TweetResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Tweet not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(tweet_id = %tweet_id, user_id = %auth_user.user_id))]
pub async fn update_tweet(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(tweet_id): Path<String>,
    AppJson(payload): AppJson<TweetRequest>,
) -> Result<ApiResponse<TweetResponse>, AppError> {
    let id = parse_id(&tweet_id, "tweet")?;
    let tweet = find_tweet(&state.db, id).await?;
    auth_user.require_owner(tweet.owner_id, "update this tweet")?;
    let content = payload.content()?;

    let mut active: tweet::ActiveModel = tweet.into();
    active.content = Set(content);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    let owner = load_owner(&state.db, updated.owner_id).await?;
    Ok(ApiResponse::ok(
        TweetResponse::new(updated, owner),
        "Tweet updated successfully",
    ))
}

#[utoipa::path(
    delete,
    path = "/{tweet_id}",
    tag = "Tweets",
    operation_id = "deleteTweet",
    summary = "Delete a tweet",
    params(("tweet_id" = String, Path, description = "Tweet ID")),
    responses(
        (status = 200, description = "Tweet deleted", body = ApiResponse<Empty>),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Tweet not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(tweet_id = %tweet_id, user_id = %auth_user.user_id))]
pub async fn delete_tweet(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(tweet_id): Path<String>,
) -> Result<ApiResponse<Empty>, AppError> {
    let id = parse_id(&tweet_id, "tweet")?;
    let tweet = find_tweet(&state.db, id).await?;
    auth_user.require_owner(tweet.owner_id, "delete this tweet")?;

    tweet::Entity::delete_by_id(id).exec(&state.db).await?;

    Ok(ApiResponse::ok(Empty {}, "Tweet deleted successfully"))
}
