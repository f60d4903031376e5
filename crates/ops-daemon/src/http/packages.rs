// packages.rs — Package-request CRUD and workflow transition routes.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use ops_model::{PackageRequest, PackageView, Priority};
use ops_store::PackageUpdate;
use ops_workflow::{CreatePackage, PackageAction};

use crate::http::error::ApiError;
use crate::http::form::SubmittedForm;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/package-requests", post(create).get(list))
        .route(
            "/api/package-requests/{id}",
            get(fetch).put(update).delete(remove),
        )
        .route(
            "/api/package-requests/{id}/confirm-payment",
            post(confirm_payment),
        )
        .route("/api/package-requests/{id}/start", post(start))
        .route("/api/package-requests/{id}/mark-ready", post(mark_ready))
        .route(
            "/api/package-requests/{id}/confirm-delivery",
            post(confirm_delivery),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBody {
    employee_id: String,
    title: String,
    description: Option<String>,
    customer_name: String,
    customer_phone: Option<String>,
    priority: Priority,
    #[serde(default)]
    metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    is_paid: bool,
}

async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateBody>,
) -> Result<(StatusCode, Json<PackageView>), ApiError> {
    let view = state.engine.create_package(CreatePackage {
        employee_id: body.employee_id,
        title: body.title,
        description: body.description,
        customer_name: body.customer_name,
        customer_phone: body.customer_phone,
        priority: body.priority,
        metadata: body.metadata,
        is_paid: body.is_paid,
    })?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<PackageRequest>>, ApiError> {
    Ok(Json(state.store.list_packages()?))
}

async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PackageView>, ApiError> {
    Ok(Json(state.store.get_package_view(&id)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBody {
    title: Option<String>,
    description: Option<String>,
    customer_name: Option<String>,
    customer_phone: Option<String>,
    priority: Option<Priority>,
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<PackageView>, ApiError> {
    let view = state.engine.update_package(
        &id,
        PackageUpdate {
            title: body.title,
            description: body.description,
            customer_name: body.customer_name,
            customer_phone: body.customer_phone,
            priority: body.priority,
            metadata: body.metadata,
        },
    )?;
    Ok(Json(view))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.engine.delete_package(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Shared body for the two transitions that carry no files.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransitionBody {
    employee_id: String,
    comment: Option<String>,
}

async fn confirm_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<PackageView>, ApiError> {
    apply_multipart_transition(state, id, PackageAction::ConfirmPayment, multipart).await
}

async fn mark_ready(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<PackageView>, ApiError> {
    apply_multipart_transition(state, id, PackageAction::MarkReady, multipart).await
}

async fn start(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<PackageView>, ApiError> {
    let view = state
        .engine
        .apply_action(&id, PackageAction::Start, &body.employee_id, body.comment, Vec::new())
        .await?;
    Ok(Json(view))
}

async fn confirm_delivery(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<PackageView>, ApiError> {
    let view = state
        .engine
        .apply_action(
            &id,
            PackageAction::ConfirmDelivery,
            &body.employee_id,
            body.comment,
            Vec::new(),
        )
        .await?;
    Ok(Json(view))
}

async fn apply_multipart_transition(
    state: AppState,
    id: String,
    action: PackageAction,
    multipart: Multipart,
) -> Result<Json<PackageView>, ApiError> {
    let form = SubmittedForm::read(multipart).await?;
    let actor = form.require("employeeId")?.to_string();
    let comment = form.optional("comment");
    let view = state
        .engine
        .apply_action(&id, action, &actor, comment, form.files)
        .await?;
    Ok(Json(view))
}
