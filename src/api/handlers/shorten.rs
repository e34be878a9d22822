//! Handler for link creation.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::url::{CreateLinkRequest, LinkResponse};
use crate::api::middleware::identity::CallerIdentity;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/url`
///
/// # Request Body
///
/// ```json
/// {
///   "longURL": "https://example.com/some/long/path",
///   "customShortURL": "promo"   // optional, signed-in callers only
/// }
/// ```
///
/// # Response
///
/// `201 Created` with the new record. Creating the same URL twice returns the
/// existing record.
///
/// ```json
/// {
///   "code": "a1b2c3",
///   "longURL": "https://example.com/some/long/path",
///   "createdAt": "2025-01-01T00:00:00Z",
///   "clickCount": 0,
///   "disabled": false
/// }
/// ```
///
/// # Errors
///
/// - 400 for invalid URLs or custom codes, taken custom codes, or guests asking
///   for a custom code
/// - 404 when the signed-in account does not exist
/// - 429 when the guest link limit is reached
/// - 500 when no free code could be allocated
pub async fn create_link_handler(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_short_link(&identity, &payload.long_url, payload.custom_code())
        .await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}
