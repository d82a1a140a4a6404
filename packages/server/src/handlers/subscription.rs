use axum::extract::{Path, Query, State};
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{subscription, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::shared::{ApiResponse, Empty, PageQuery};
use crate::models::subscription::{
    ChannelListResponse, SubscriberListResponse, SubscriptionResponse,
};
use crate::models::user::UserSummary;
use crate::state::AppState;
use crate::utils::id::parse_id;
use crate::utils::listing::Pager;
use crate::utils::owner::{attach_owners, load_owners};

async fn require_user<C: ConnectionTrait>(db: &C, id: Uuid, what: &str) -> Result<(), AppError> {
    let exists = user::Entity::find_by_id(id).count(db).await? > 0;
    if exists {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("{what} not found")))
    }
}

/// Page through the edges matched by `select`, resolving the user on the
/// `side` of each edge to its public projection.
async fn page_users(
    state: &AppState,
    select: Select<subscription::Entity>,
    pager: Pager,
    side: subscription::Column,
) -> Result<(Vec<UserSummary>, u64), AppError> {
    let total = select.clone().count(&state.db).await?;

    let edges = select
        .order_by_desc(subscription::Column::CreatedAt)
        .order_by_desc(side)
        .offset(Some(pager.offset()))
        .limit(Some(pager.limit))
        .all(&state.db)
        .await?;

    let pick = move |edge: &subscription::Model| match side {
        subscription::Column::SubscriberId => edge.subscriber_id,
        _ => edge.channel_id,
    };

    let users = load_owners(&state.db, edges.iter().map(pick)).await?;
    let users = attach_owners(edges, &users, pick, |_, user| user)?;
    Ok((users, total))
}

#[utoipa::path(
    post,
    path = "/c/{channel_id}",
    tag = "Subscriptions",
    operation_id = "subscribe",
    summary = "Subscribe to a channel",
    params(("channel_id" = String, Path, description = "User ID of the channel")),
    responses(
        (status = 201, description = "Subscribed", body = ApiResponse<SubscriptionResponse>),
        (status = 400, description = "Malformed ID or self-subscription (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Channel not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already subscribed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(channel_id = %channel_id, user_id = %auth_user.user_id))]
pub async fn subscribe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<ApiResponse<SubscriptionResponse>, AppError> {
    let channel_id = parse_id(&channel_id, "channel")?;
    require_user(&state.db, channel_id, "Channel").await?;

    if channel_id == auth_user.user_id {
        return Err(AppError::Validation(
            "You cannot subscribe to yourself".into(),
        ));
    }

    let already = subscription::Entity::find_by_id((auth_user.user_id, channel_id))
        .one(&state.db)
        .await?;
    if already.is_some() {
        return Err(AppError::Conflict(
            "Already subscribed to this channel".into(),
        ));
    }

    let edge = subscription::ActiveModel {
        subscriber_id: Set(auth_user.user_id),
        channel_id: Set(channel_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    // The composite key still decides when two requests race past the check.
    let edge = edge.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Already subscribed to this channel".into())
        }
        _ => AppError::from(e),
    })?;

    Ok(ApiResponse::created(
        SubscriptionResponse::from(edge),
        "Subscribed successfully",
    ))
}

#[utoipa::path(
    delete,
    path = "/c/{channel_id}",
    tag = "Subscriptions",
    operation_id = "unsubscribe",
    summary = "Unsubscribe from a channel",
    params(("channel_id" = String, Path, description = "User ID of the channel")),
    responses(
        (status = 200, description = "Unsubscribed", body = ApiResponse<Empty>),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not subscribed (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(channel_id = %channel_id, user_id = %auth_user.user_id))]
pub async fn unsubscribe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<ApiResponse<Empty>, AppError> {
    let channel_id = parse_id(&channel_id, "channel")?;

    let result = subscription::Entity::delete_by_id((auth_user.user_id, channel_id))
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Subscription not found".into()));
    }

    Ok(ApiResponse::ok(Empty {}, "Unsubscribed successfully"))
}

#[utoipa::path(
    get,
    path = "/c/{channel_id}/subscribers",
    tag = "Subscriptions",
    operation_id = "listChannelSubscribers",
    summary = "List a channel's subscribers",
    description = "Most recent subscribers first.",
    params(("channel_id" = String, Path, description = "User ID of the channel"), PageQuery),
    responses(
        (status = 200, description = "Page of subscribers", body = ApiResponse<SubscriberListResponse>),
        (status = 400, description = "Malformed ID or paging (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Channel not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query), fields(channel_id = %channel_id))]
pub async fn list_subscribers(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<ApiResponse<SubscriberListResponse>, AppError> {
    let channel_id = parse_id(&channel_id, "channel")?;
    let pager = Pager::from_params(query.page.as_deref(), query.limit.as_deref())?;
    require_user(&state.db, channel_id, "Channel").await?;

    let select =
        subscription::Entity::find().filter(subscription::Column::ChannelId.eq(channel_id));
    let (subscribers, total) =
        page_users(&state, select, pager, subscription::Column::SubscriberId).await?;

    Ok(ApiResponse::ok(
        SubscriberListResponse {
            subscribers,
            pagination: pager.pagination(total),
        },
        "Subscribers fetched successfully",
    ))
}

#[utoipa::path(
    get,
    path = "/u/{subscriber_id}/channels",
    tag = "Subscriptions",
    operation_id = "listSubscribedChannels",
    summary = "List the channels a user subscribes to",
    description = "Most recent subscriptions first.",
    params(("subscriber_id" = String, Path, description = "User ID of the subscriber"), PageQuery),
    responses(
        (status = 200, description = "Page of channels", body = ApiResponse<ChannelListResponse>),
        (status = 400, description = "Malformed ID or paging (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query), fields(subscriber_id = %subscriber_id))]
pub async fn list_subscribed_channels(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(subscriber_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<ApiResponse<ChannelListResponse>, AppError> {
    let subscriber_id = parse_id(&subscriber_id, "subscriber")?;
    let pager = Pager::from_params(query.page.as_deref(), query.limit.as_deref())?;
    require_user(&state.db, subscriber_id, "User").await?;

    let select =
        subscription::Entity::find().filter(subscription::Column::SubscriberId.eq(subscriber_id));
    let (channels, total) =
        page_users(&state, select, pager, subscription::Column::ChannelId).await?;

    Ok(ApiResponse::ok(
        ChannelListResponse {
            channels,
            pagination: pager.pagination(total),
        },
        "Subscribed channels fetched successfully",
    ))
}
