//! DTOs for the `/api/url` endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::ShortLink;

/// Request body for `POST /api/url`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[serde(rename = "longURL")]
    #[validate(length(min = 1, max = 2048, message = "longURL must be 1-2048 characters"))]
    pub long_url: String,

    /// Optional custom code; an empty string means "generate one".
    #[serde(rename = "customShortURL", default)]
    pub custom_short_url: Option<String>,
}

impl CreateLinkRequest {
    /// The custom code, if one was actually provided.
    pub fn custom_code(&self) -> Option<&str> {
        self.custom_short_url
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Request body for `PATCH /api/url/{code}`.
///
/// Both fields are optional, but at least one must be present.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[serde(rename = "longURL", default)]
    #[validate(length(min = 1, max = 2048, message = "longURL must be 1-2048 characters"))]
    pub long_url: Option<String>,

    #[serde(default)]
    pub disable: Option<bool>,
}

/// A short link as returned by the API.
///
/// The owner is not exposed: for guests it is their IP address.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub code: String,
    #[serde(rename = "longURL")]
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub click_count: i64,
    pub disabled: bool,
}

impl From<ShortLink> for LinkResponse {
    fn from(link: ShortLink) -> Self {
        Self {
            code: link.code,
            long_url: link.original_url,
            created_at: link.created_at,
            click_count: link.click_count,
            disabled: link.disabled,
        }
    }
}

/// Response for `GET /api/url`.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub total: usize,
    pub items: Vec<LinkResponse>,
}
