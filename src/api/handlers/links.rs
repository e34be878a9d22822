//! Handlers for reading and editing links.

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::api::dto::url::{LinkListResponse, LinkResponse, UpdateLinkRequest};
use crate::api::middleware::identity::CallerIdentity;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the caller's links, newest first.
///
/// # Endpoint
///
/// `GET /api/url`
///
/// # Errors
///
/// Returns 401 Unauthorized for guests.
pub async fn list_links_handler(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
) -> Result<Json<LinkListResponse>, AppError> {
    let links = state.link_service.list_links_for_owner(&identity).await?;

    let items: Vec<LinkResponse> = links.into_iter().map(Into::into).collect();
    Ok(Json(LinkListResponse {
        total: items.len(),
        items,
    }))
}

/// Returns one of the caller's links, including disabled ones.
///
/// # Endpoint
///
/// `GET /api/url/{code}`
///
/// # Errors
///
/// - 401 Unauthorized for guests
/// - 404 Not Found if the link does not exist or belongs to someone else
pub async fn get_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_link(&identity, &code).await?;
    Ok(Json(link.into()))
}

/// Changes a link's destination and/or disables it.
///
/// # Endpoint
///
/// `PATCH /api/url/{code}`
///
/// # Request Body
///
/// ```json
/// {
///   "longURL": "https://new-destination.com",   // optional
///   "disable": true                             // optional
/// }
/// ```
///
/// Redirects observe the change immediately.
///
/// # Errors
///
/// - 400 if neither field is present or the URL is invalid
/// - 404 if the link does not exist or belongs to someone else
pub async fn update_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .update_link(
            &identity,
            &code,
            payload.long_url.as_deref(),
            payload.disable,
        )
        .await?;

    Ok(Json(link.into()))
}
