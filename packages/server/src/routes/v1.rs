use utoipa_axum::{router::OpenApiRouter, routes};

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/tweets", tweet_routes())
        .nest("/videos", video_routes(config))
        .nest("/subscriptions", subscription_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn tweet_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::tweet::create_tweet))
        .routes(routes!(handlers::tweet::list_user_tweets))
        .routes(routes!(
            handlers::tweet::get_tweet,
            handlers::tweet::update_tweet,
            handlers::tweet::delete_tweet
        ))
}

fn video_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::video::list_videos,
            handlers::video::publish_video
        ))
        .routes(routes!(
            handlers::video::get_video,
            handlers::video::update_video,
            handlers::video::delete_video
        ))
        .routes(routes!(handlers::video::toggle_publish))
        .layer(handlers::video::media_body_limit(
            config.storage.max_upload_size,
        ))
}

fn subscription_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::subscription::subscribe,
            handlers::subscription::unsubscribe
        ))
        .routes(routes!(handlers::subscription::list_subscribers))
        .routes(routes!(handlers::subscription::list_subscribed_channels))
}
