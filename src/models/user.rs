// src/models/user.rs

use serde::{Deserialize, Serialize};

/// Access level granted at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Student,
    Admin,
}

/// A logged-in participant.
/// Constructed at login and carried in the session token; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Login form. The `mode` field picks which half of the form was submitted.
#[derive(Debug, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum LoginRequest {
    Student {
        #[serde(default)]
        name: String,
        #[serde(default, rename = "studentId")]
        student_id: String,
    },
    Admin {
        #[serde(default)]
        passcode: String,
    },
}

/// Response body for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub user: User,
}
