//! Session API endpoints: one consultation per session, driven through its state machine.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::AppState;
use crate::context::EditTarget;
use crate::error::I18nError;
use crate::session::SessionSnapshot;
use crate::wizard::WizardInput;

/// Request body for PUT /api/sessions/{id}/query and POST /api/sessions/{id}/follow-up
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// Request body for POST /api/sessions/{id}/query
#[derive(Debug, Default, Deserialize)]
pub struct SubmitQueryRequest {
    /// Replaces the draft before submitting when present
    #[serde(default)]
    pub text: Option<String>,
}

/// Request body for POST /api/sessions/{id}/edit
#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub target: EditTarget,
}

type SnapshotResult = Result<Json<SessionSnapshot>, I18nError>;

/// POST /api/sessions - start a new consultation in setup mode
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SessionSnapshot>) {
    (StatusCode::CREATED, Json(state.service.create_session()))
}

/// GET /api/sessions/{id}
pub async fn get_session_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> SnapshotResult {
    let snapshot = state
        .service
        .snapshot(id)
        .map_err(|e| state.i18n_error(e))?;
    Ok(Json(snapshot))
}

/// DELETE /api/sessions/{id}
pub async fn delete_session_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, I18nError> {
    state
        .service
        .delete_session(id)
        .map_err(|e| state.i18n_error(e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sessions/{id}/wizard - apply one wizard input
pub async fn wizard_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(input): Json<WizardInput>,
) -> SnapshotResult {
    let snapshot = state
        .service
        .wizard_input(id, input)
        .await
        .map_err(|e| state.i18n_error(e))?;
    Ok(Json(snapshot))
}

/// PUT /api/sessions/{id}/query - replace the draft question
pub async fn set_query_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<TextRequest>,
) -> SnapshotResult {
    let snapshot = state
        .service
        .set_query(id, request.text)
        .map_err(|e| state.i18n_error(e))?;
    Ok(Json(snapshot))
}

/// POST /api/sessions/{id}/query - submit the opening question and wait for the reply
pub async fn submit_query_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitQueryRequest>,
) -> SnapshotResult {
    let snapshot = state
        .service
        .submit_query(id, request.text)
        .await
        .map_err(|e| state.i18n_error(e))?;
    Ok(Json(snapshot))
}

/// POST /api/sessions/{id}/follow-up
pub async fn follow_up_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<TextRequest>,
) -> SnapshotResult {
    let snapshot = state
        .service
        .follow_up(id, &request.text)
        .await
        .map_err(|e| state.i18n_error(e))?;
    Ok(Json(snapshot))
}

/// POST /api/sessions/{id}/edit - open one part of the context for editing
pub async fn open_edit_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<EditRequest>,
) -> SnapshotResult {
    let snapshot = state
        .service
        .open_edit(id, request.target)
        .map_err(|e| state.i18n_error(e))?;
    Ok(Json(snapshot))
}

/// POST /api/sessions/{id}/edit/cancel
pub async fn cancel_edit_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> SnapshotResult {
    let snapshot = state
        .service
        .cancel_edit(id)
        .map_err(|e| state.i18n_error(e))?;
    Ok(Json(snapshot))
}

/// POST /api/sessions/{id}/reset - clear the conversation, keep the context
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> SnapshotResult {
    let snapshot = state
        .service
        .reset(id)
        .map_err(|e| state.i18n_error(e))?;
    Ok(Json(snapshot))
}
