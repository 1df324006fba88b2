// src/models/support.rs

use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

/// Globally shared support settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportConfig {
    pub meet_link: String,
}

/// DTO for updating the support settings.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupportRequest {
    #[validate(custom(function = validate_meet_link))]
    pub meet_link: String,
}

fn validate_meet_link(link: &str) -> Result<(), validator::ValidationError> {
    match Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_meet_link")),
    }
}
