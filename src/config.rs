// src/config.rs

use std::{env, path::PathBuf};

use dotenvy::dotenv;

/// Passcode accepted for the administrator role when `ADMIN_PASSCODE` is unset.
/// This is a placeholder, not a security boundary.
pub const DEFAULT_ADMIN_PASSCODE: &str = "admin123";

/// Meeting link used until an administrator configures one.
pub const DEFAULT_MEET_LINK: &str = "https://meet.google.com/new";

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    /// True when `jwt_secret` was generated at startup.
    pub ephemeral_secret: bool,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub admin_passcode: String,
    /// Directory holding the persisted JSON blobs.
    pub data_dir: PathBuf,
    pub default_meet_link: String,
    pub bind_addr: String,
    pub cors_origins: Vec<String>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        // Without a configured secret, tokens only live as long as the process.
        let (jwt_secret, ephemeral_secret) = match env::var("JWT_SECRET") {
            Ok(secret) => (secret, false),
            Err(_) => (uuid::Uuid::new_v4().simple().to_string(), true),
        };

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let admin_passcode =
            env::var("ADMIN_PASSCODE").unwrap_or_else(|_| DEFAULT_ADMIN_PASSCODE.to_string());

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let default_meet_link =
            env::var("DEFAULT_MEET_LINK").unwrap_or_else(|_| DEFAULT_MEET_LINK.to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_else(|_| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://127.0.0.1:3000".to_string(),
                ]
            });

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            jwt_secret,
            ephemeral_secret,
            jwt_expiration,
            admin_passcode,
            data_dir,
            default_meet_link,
            bind_addr,
            cors_origins,
            rust_log,
        }
    }
}
