// src/handlers/admin.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    identity,
    models::{
        call::{CallCreated, Initiator},
        question::{CreateQuestionRequest, DeleteQuestionQuery},
        support::UpdateSupportRequest,
    },
    state::AppState,
    store::PlatformStore,
};

/// Lists the full question bank, answer keys included.
/// Admin only.
pub async fn list_questions(State(store): State<Arc<PlatformStore>>) -> impl IntoResponse {
    Json(store.questions())
}

/// Posts a new question to the bank.
/// Admin only.
pub async fn create_question(
    State(store): State<Arc<PlatformStore>>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question = store.add_question(payload)?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// Deletes a question by ID once the caller confirms with `?confirm=true`.
/// Admin only.
pub async fn delete_question(
    State(store): State<Arc<PlatformStore>>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuestionQuery>,
) -> Result<impl IntoResponse, AppError> {
    if !query.confirm {
        return Err(AppError::BadRequest(
            "Deleting a question must be confirmed".to_string(),
        ));
    }

    store.delete_question(&id)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Per-student performance, including whether each student is currently on a call.
/// Admin only.
pub async fn reports(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.reports(&state.calls))
}

/// Calls a student known from the submission log.
/// Returns the student's existing call if they already have one.
/// Admin only.
pub async fn call_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = student_id.to_uppercase();
    let name = state
        .store
        .student_name(&student_id)
        .ok_or_else(|| AppError::NotFound("Student has no recorded activity".to_string()))?;

    let student = identity::student_for_id(&student_id, &name);
    let call_id = state.calls.initiate(&student, Initiator::Admin);

    Ok((StatusCode::CREATED, Json(CallCreated { call_id })))
}

/// Updates the meeting link used for live sessions.
/// Admin only.
pub async fn update_support(
    State(store): State<Arc<PlatformStore>>,
    Json(payload): Json<UpdateSupportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let config = store.update_support(payload)?;

    Ok(Json(config))
}
