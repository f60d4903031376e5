// reports.rs — Report reads, updates, stage confirmations, and the
// discussion thread routes.

use axum::extract::{Multipart, Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use ops_model::{AdminNote, Report, Reply};

use crate::http::error::ApiError;
use crate::http::form::SubmittedForm;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/reports/{id}", get(fetch).put(update))
        .route("/api/reports/{id}/evaluation", put(set_evaluation))
        .route("/api/reports/{id}/confirm-stage", post(confirm_stage))
        .route("/api/reports/{id}/add-exception", post(add_exception))
        .route("/api/reports/{id}/notes", post(add_note))
        .route("/api/reports/{id}/notes/{note_id}/reply", post(add_reply))
        .route("/api/reports/{id}/notes/read", post(mark_read))
}

async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Report>, ApiError> {
    Ok(Json(state.store.get_report(&id)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBody {
    employee_id: String,
    status: Option<String>,
    note: Option<String>,
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<Report>, ApiError> {
    let report = state
        .engine
        .update_report(&id, &body.employee_id, body.status, body.note)?;
    Ok(Json(report))
}

async fn set_evaluation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(evaluation): Json<serde_json::Value>,
) -> Result<Json<Report>, ApiError> {
    Ok(Json(state.engine.set_evaluation(&id, evaluation)?))
}

async fn confirm_stage(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Report>, ApiError> {
    let form = SubmittedForm::read(multipart).await?;
    let stage_id = form.require("stageId")?.to_string();
    let actor = form.require("employeeId")?.to_string();
    let comment = form.optional("comment");
    let report = state
        .engine
        .confirm_stage(&id, &stage_id, comment, &actor, form.files)
        .await?;
    Ok(Json(report))
}

async fn add_exception(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Report>, ApiError> {
    let form = SubmittedForm::read(multipart).await?;
    let comment = form.require("comment")?.to_string();
    let actor = form.require("employeeId")?.to_string();
    let report = state
        .engine
        .add_exception(&id, comment, &actor, form.files)
        .await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteBody {
    author_id: String,
    author_name: String,
    content: String,
}

async fn add_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<NoteBody>,
) -> Result<Json<AdminNote>, ApiError> {
    let note = state
        .discussion
        .add_note(&id, &body.author_id, &body.author_name, &body.content)
        .await?;
    Ok(Json(note))
}

async fn add_reply(
    State(state): State<AppState>,
    Path((id, note_id)): Path<(String, Uuid)>,
    Json(body): Json<NoteBody>,
) -> Result<Json<Reply>, ApiError> {
    let reply = state
        .discussion
        .add_reply(&id, note_id, &body.author_id, &body.author_name, &body.content)
        .await?;
    Ok(Json(reply))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkReadBody {
    user_id: String,
}

async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MarkReadBody>,
) -> Result<axum::http::StatusCode, ApiError> {
    state.discussion.mark_read(&id, &body.user_id)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
