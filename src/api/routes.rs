//! API route configuration.
//!
//! Every route takes the caller's identity from the trusted identity header,
//! falling back to a guest identity keyed by client IP.

use crate::api::handlers::{
    click_history_handler, create_link_handler, get_link_handler, list_links_handler,
    qr_code_handler, update_link_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All `/api` routes.
///
/// # Endpoints
///
/// - `POST  /url`               - Create a short link
/// - `GET   /url`               - List the caller's links (signed-in only)
/// - `GET   /url/{code}`        - Fetch a link
/// - `PATCH /url/{code}`        - Change destination / disable
/// - `GET   /url/{code}/clicks` - Click history
/// - `GET   /url/{code}/qr`     - PNG QR code of the short link
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/url", post(create_link_handler).get(list_links_handler))
        .route(
            "/url/{code}",
            get(get_link_handler).patch(update_link_handler),
        )
        .route("/url/{code}/clicks", get(click_history_handler))
        .route("/url/{code}/qr", get(qr_code_handler))
}
