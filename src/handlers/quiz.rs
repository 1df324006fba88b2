// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{submission::AnswerRequest, user::User},
    store::PlatformStore,
    utils::jwt::Claims,
};

fn require_student(claims: &Claims) -> Result<User, AppError> {
    let user = claims.user();
    if user.is_admin() {
        return Err(AppError::Forbidden(
            "Only students can answer questions".to_string(),
        ));
    }
    Ok(user)
}

/// Lists the question bank for the current student.
///
/// Answer keys and explanations are only included for questions the student has answered.
pub async fn list_questions(
    State(store): State<Arc<PlatformStore>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    Json(store.questions_for_student(&claims.user()))
}

/// Records an answer and returns the submission, including its note ID.
pub async fn answer_question(
    State(store): State<Arc<PlatformStore>>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<String>,
    Json(req): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let student = require_student(&claims)?;
    let submission = store.answer(&student, &question_id, req.answer)?;

    Ok((StatusCode::CREATED, Json(submission)))
}

/// The current student's submissions, newest first, with overall accuracy.
pub async fn my_submissions(
    State(store): State<Arc<PlatformStore>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    Json(store.history(&claims.sub))
}

/// The shared support settings (meeting link).
pub async fn get_support(State(store): State<Arc<PlatformStore>>) -> impl IntoResponse {
    Json(store.support_config())
}
