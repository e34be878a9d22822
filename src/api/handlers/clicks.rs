//! Handler for click history.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::clicks::{ClickHistoryResponse, ClickInfo};
use crate::api::middleware::identity::CallerIdentity;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the recorded clicks of a link, oldest first.
///
/// # Endpoint
///
/// `GET /api/url/{code}/clicks`
///
/// Clicks are written in the background, so a redirect that just happened may
/// not be listed yet.
///
/// # Errors
///
/// - 401 Unauthorized for guests
/// - 404 Not Found for unknown codes and links owned by someone else
pub async fn click_history_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
) -> Result<Json<ClickHistoryResponse>, AppError> {
    let clicks = state
        .click_service
        .get_click_history(&identity, &code)
        .await?;

    let items: Vec<ClickInfo> = clicks.into_iter().map(Into::into).collect();
    Ok(Json(ClickHistoryResponse {
        code,
        total: items.len(),
        items,
    }))
}
