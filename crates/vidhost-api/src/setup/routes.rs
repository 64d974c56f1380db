//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::constants::{DEFAULT_HTTP_CONCURRENCY_LIMIT, MULTIPART_OVERHEAD_BYTES};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use vidhost_core::Config;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let timed_routes = Router::new()
        .route("/api/videos", get(handlers::videos::list_videos))
        .route(
            "/api/videos/bycreator",
            get(handlers::videos::list_videos_by_creator),
        )
        .route("/api/videos/{fileName}", get(handlers::media_proxy::get_video))
        .route(
            "/api/thumbnails/{fileName}",
            get(handlers::media_proxy::get_thumbnail),
        )
        .route("/api/login", post(handlers::login::login))
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/health", get(handlers::health::liveness_check))
        .route("/health/ready", get(handlers::health::readiness_check));

    // Uploads stream large bodies and run transcodes, so they sit outside the
    // request timeout.
    let upload_routes = Router::new().route(
        "/upload_video",
        post(handlers::upload::upload_video).layer(DefaultBodyLimit::disable()),
    );

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_HTTP_CONCURRENCY_LIMIT)
        .max(1);
    let request_timeout = Duration::from_secs(config.base.request_timeout_secs.max(1));
    let body_limit = config
        .max_video_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    tracing::info!(
        http_concurrency_limit,
        request_timeout_secs = request_timeout.as_secs(),
        body_limit_bytes = body_limit,
        "HTTP layers configured"
    );

    let app = timed_routes
        .layer(TimeoutLayer::new(request_timeout))
        .merge(upload_routes)
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
