//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;
use url::Url;

use crate::api::middleware::identity::ClientIp;
use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve the code through the redirect cache (store read on a miss)
/// 2. Refuse disabled links
/// 3. Bump the cached click counter and queue a click event
/// 4. Return `302 Found`
///
/// # Click Tracking
///
/// Click events are sent to a bounded channel for async processing.
/// If the queue is full, the click is dropped (fire-and-forget).
///
/// # Errors
///
/// - 404 Not Found if the short code doesn't exist
/// - 410 Gone if the link is disabled
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let link = state.link_service.resolve_for_redirect(&code).await?;
    let location = location_header(&link.original_url)?;

    state.click_service.record_click(ClickEvent::new(
        link.code,
        ip.to_string(),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
    ));

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]))
}

/// Builds the `Location` value, percent-encoding URLs that are not plain ASCII.
fn location_header(target: &str) -> Result<HeaderValue, AppError> {
    if let Ok(value) = HeaderValue::from_str(target) {
        return Ok(value);
    }

    Url::parse(target)
        .ok()
        .and_then(|url| HeaderValue::from_str(url.as_str()).ok())
        .ok_or_else(|| {
            tracing::error!("Stored URL cannot be used as a redirect target: {}", target);
            AppError::bad_request("Stored URL is not a valid redirect target", json!({}))
        })
}
