// src/identity.rs

//! Turns a submitted login form into a [`User`].
//!
//! Nothing is verified against an external source: students are whoever they
//! say they are, and the administrator passcode is a configured literal.

use crate::{
    error::AppError,
    models::user::{LoginRequest, Role, User},
};

pub const ADMIN_ID: &str = "ADMIN-ROOT";
pub const ADMIN_NAME: &str = "System Administrator";
pub const ADMIN_EMAIL: &str = "admin@aptimaster.com";
pub const STUDENT_EMAIL_DOMAIN: &str = "student.aptimaster.com";

pub fn resolve(req: LoginRequest, admin_passcode: &str) -> Result<User, AppError> {
    match req {
        LoginRequest::Student { name, student_id } => student(&name, &student_id),
        LoginRequest::Admin { passcode } => admin(&passcode, admin_passcode),
    }
}

/// Student identity. The ID is normalized to upper case so `stu-001` and `STU-001` match.
pub fn student(name: &str, student_id: &str) -> Result<User, AppError> {
    let name = name.trim();
    let student_id = student_id.trim();
    if name.is_empty() || student_id.is_empty() {
        return Err(AppError::BadRequest(
            "Please provide both your name and unique ID.".to_string(),
        ));
    }

    Ok(student_for_id(student_id, name))
}

/// Rebuilds a student record for an already-known ID, e.g. when the administrator calls them.
pub fn student_for_id(student_id: &str, name: &str) -> User {
    User {
        id: student_id.to_uppercase(),
        name: name.to_string(),
        email: format!("{}@{}", student_id.to_lowercase(), STUDENT_EMAIL_DOMAIN),
        role: Role::Student,
    }
}

pub fn admin(passcode: &str, expected: &str) -> Result<User, AppError> {
    if passcode != expected {
        tracing::warn!("Rejected administrator login attempt");
        return Err(AppError::AuthError(
            "Invalid administrative credentials.".to_string(),
        ));
    }

    Ok(User {
        id: ADMIN_ID.to_string(),
        name: ADMIN_NAME.to_string(),
        email: ADMIN_EMAIL.to_string(),
        role: Role::Admin,
    })
}
