pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod media;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::Json;
use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};

use crate::config::{CorsConfig, StorageBackend};
use crate::error::{AppError, panic_response};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vidline API",
        version = "1.0.0",
        description = "Video sharing backend: accounts, videos, tweets and subscriptions"
    ),
    tags(
        (name = "Auth", description = "Registration, login and the current user"),
        (name = "Tweets", description = "Short text posts"),
        (name = "Videos", description = "Video publishing, discovery and management"),
        (name = "Subscriptions", description = "Channel subscriptions between users"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(config.max_age))
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".into())
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes(&state.config))
        .split_for_parts();

    let storage = &state.config.storage;
    let media_root = (storage.backend == StorageBackend::Filesystem)
        .then(|| storage.filesystem.root.clone());
    let cors = cors_layer(&state.config.server.cors);

    let mut router = router
        .with_state(state)
        .route("/api-docs/openapi.json", get({
            let api = api.clone();
            move || async move { Json(api) }
        }))
        .merge(Scalar::with_url("/scalar", api));

    if let Some(root) = media_root {
        router = router.nest_service("/media", ServeDir::new(root));
    }

    router
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
