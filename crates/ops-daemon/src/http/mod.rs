// mod.rs — Router assembly.

pub mod auth;
pub mod error;
pub mod form;
pub mod imports;
pub mod notifications;
pub mod packages;
pub mod reports;

use axum::extract::State;
use axum::http::Uri;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use ops_model::Branch;

use crate::http::error::ApiError;
use crate::state::AppState;

/// The complete API surface.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(packages::routes())
        .merge(reports::routes())
        .merge(auth::routes())
        .merge(notifications::routes())
        .merge(imports::routes())
        .route("/api/branches", get(list_branches))
        .route("/healthz", get(healthz))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_branches(State(state): State<AppState>) -> Result<Json<Vec<Branch>>, ApiError> {
    Ok(Json(state.store.list_branches()?))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("no route for {}", uri.path()))
}
