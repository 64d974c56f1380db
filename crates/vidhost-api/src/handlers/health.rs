//! Health check handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

use crate::state::AppState;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Key probed to check that the blob store answers. It does not need to exist.
const STORAGE_PROBE_KEY: &str = "health/probe";

/// Run an async check with a timeout: "ready", "timeout", or "not_ready: {error}".
async fn run_check<F, E>(f: F, component: &'static str) -> (bool, String)
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(CHECK_TIMEOUT, f).await {
        Ok(Ok(())) => (true, "ready".to_string()),
        Ok(Err(e)) => {
            tracing::error!(component, error = %e, "Readiness check failed");
            (false, format!("not_ready: {}", e))
        }
        Err(_) => {
            tracing::error!(component, "Readiness check timed out");
            (false, "timeout".to_string())
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: String,
    pub catalog: String,
    pub catalog_backend: String,
    pub storage: String,
    pub storage_backend: String,
}

/// Liveness probe - process is running.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - catalog round trip and blob store reachability.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Dependencies reachable", body = ReadinessResponse),
        (status = 503, description = "A dependency is unreachable", body = ReadinessResponse)
    )
)]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (catalog_ok, catalog) = run_check(state.catalog.ping(), "catalog").await;
    let (storage_ok, storage) = run_check(
        async {
            state
                .blob_store
                .exists(STORAGE_PROBE_KEY)
                .await
                .map(|_| ())
        },
        "storage",
    )
    .await;

    let ready = catalog_ok && storage_ok;
    let body = ReadinessResponse {
        status: if ready { "ready" } else { "not_ready" }.to_string(),
        catalog,
        catalog_backend: state.catalog.backend().to_string(),
        storage,
        storage_backend: state.blob_store.backend_name().to_string(),
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}
