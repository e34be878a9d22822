//! Handler for short link QR codes.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use serde_json::json;

use crate::api::middleware::identity::CallerIdentity;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::qr_code::render_png;

/// Returns a PNG QR code pointing at one of the caller's short links.
///
/// # Endpoint
///
/// `GET /api/url/{code}/qr`
///
/// The encoded address is `PUBLIC_URL/{code}`.
///
/// # Errors
///
/// - 401 Unauthorized for guests
/// - 404 Not Found if the link does not exist or belongs to someone else
pub async fn qr_code_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
) -> Result<impl IntoResponse, AppError> {
    let link = state.link_service.get_link(&identity, &code).await?;

    let png = render_png(&state.short_url(&link.code)).map_err(|e| {
        tracing::warn!("QR rendering failed for {}: {}", link.code, e);
        AppError::bad_request("Failed to generate QR code", json!({ "code": link.code }))
    })?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
