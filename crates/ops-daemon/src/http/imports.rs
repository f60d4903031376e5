// imports.rs — Customs import/export requests, capability-guarded.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use ops_model::{ImportExportKind, ImportExportRequest};

use crate::http::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/import-export-requests", post(create).get(list))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBody {
    employee_id: String,
    kind: ImportExportKind,
    items: serde_json::Value,
}

async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateBody>,
) -> Result<(StatusCode, Json<ImportExportRequest>), ApiError> {
    let user = state.store.get_user(&body.employee_id)?;
    let allowed = match body.kind {
        ImportExportKind::Import => user.can_import,
        ImportExportKind::Export => user.can_export,
    };
    if !allowed {
        let kind = match body.kind {
            ImportExportKind::Import => "import",
            ImportExportKind::Export => "export",
        };
        return Err(ApiError::PermissionDenied(format!(
            "user '{}' may not file {kind} requests",
            user.id
        )));
    }

    let request = ImportExportRequest {
        id: Uuid::new_v4(),
        employee_id: user.id,
        kind: body.kind,
        items: body.items,
        status: "pending".to_string(),
        created_at: Utc::now(),
    };
    state.store.insert_import_export(&request)?;
    Ok((StatusCode::CREATED, Json(request)))
}

async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<ImportExportRequest>>, ApiError> {
    Ok(Json(state.store.list_import_exports()?))
}
