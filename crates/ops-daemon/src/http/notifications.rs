// notifications.rs — In-app notification listing and device registration.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use ops_model::Notification;

use crate::http::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/{id}/notifications", get(list))
        .route("/api/notifications/{id}/read", post(mark_read))
        .route("/api/users/{id}/device-tokens", post(register_device))
}

async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    Ok(Json(state.store.list_notifications(&user_id)?))
}

async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.store.mark_notification_read(id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct RegisterDeviceBody {
    token: String,
}

async fn register_device(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<RegisterDeviceBody>,
) -> Result<StatusCode, ApiError> {
    if body.token.trim().is_empty() {
        return Err(ApiError::InvalidArgument("empty device token".to_string()));
    }
    state.store.upsert_device_token(&user_id, &body.token)?;
    Ok(StatusCode::NO_CONTENT)
}
