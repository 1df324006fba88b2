// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{
    config::Config,
    error::AppError,
    identity,
    models::user::{LoginRequest, LoginResponse},
    utils::jwt::{Claims, sign_jwt},
};

/// Resolves the login form into a user and returns a session token.
///
/// Students need a non-empty name and ID; the administrator needs the passcode.
pub async fn login(
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = identity::resolve(payload, &config.admin_passcode)?;

    let token = sign_jwt(&user, &config.jwt_secret, config.jwt_expiration)?;

    tracing::info!(user_id = %user.id, role = ?user.role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer",
        user,
    }))
}

/// Returns the user carried by the current token.
pub async fn me(Extension(claims): Extension<Claims>) -> impl IntoResponse {
    Json(claims.user())
}
