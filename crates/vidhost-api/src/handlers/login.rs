use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use vidhost_core::models::{LoginRequest, LoginResponse, MessageResponse, UserRecord};
use vidhost_core::{AppError, ErrorMetadata};

use crate::constants::LOGIN_SUCCESS_MESSAGE;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Credential check against the catalog's user records. Passwords are
/// compared verbatim.
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 401, description = "Unknown user or wrong password", body = MessageResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "login", username = %request.username))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    match authenticate(&state, &request).await {
        Ok(user) => {
            tracing::info!("Login successful");
            let body = LoginResponse {
                message: LOGIN_SUCCESS_MESSAGE.to_string(),
                display_name: user.display_name,
            };
            Ok((StatusCode::OK, Json(body)).into_response())
        }
        Err(AppError::AuthFailed) => {
            tracing::debug!("Login rejected");
            let body = MessageResponse {
                message: AppError::AuthFailed.client_message(),
            };
            Ok((StatusCode::UNAUTHORIZED, Json(body)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

async fn authenticate(state: &AppState, request: &LoginRequest) -> Result<UserRecord, AppError> {
    if request.username.is_empty() || request.password.is_empty() {
        return Err(AppError::AuthFailed);
    }

    state
        .catalog
        .find_user_by_credentials(&request.username, &request.password)
        .await
        .map_err(|e| AppError::Catalog(e.to_string()))?
        .ok_or(AppError::AuthFailed)
}
