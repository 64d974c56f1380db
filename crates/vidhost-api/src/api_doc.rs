//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use vidhost_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "vidhost API",
        version = "0.1.0",
        description = "Video upload, catalog listing and media proxy"
    ),
    paths(
        handlers::videos::list_videos,
        handlers::videos::list_videos_by_creator,
        handlers::login::login,
        handlers::media_proxy::get_thumbnail,
        handlers::media_proxy::get_video,
        handlers::upload::upload_video,
        handlers::health::liveness_check,
        handlers::health::readiness_check,
    ),
    components(schemas(
        models::VideoRecord,
        models::LoginRequest,
        models::LoginResponse,
        models::MessageResponse,
        error::ErrorResponse,
        handlers::health::ReadinessResponse,
    )),
    tags(
        (name = "videos", description = "Catalog listings"),
        (name = "auth", description = "Credential check"),
        (name = "media", description = "Stored media proxy"),
        (name = "upload", description = "Video ingestion"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
