//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}` - Short link redirect (public)
//! - `GET  /health` - Health check: store, click queue, cache (public)
//! - `/api/*`       - REST API (identity from the trusted header, else guest)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on `/api` (proxy-aware)
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::api::routes::api_routes;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the router without path normalization.
///
/// `rate_limited` controls the `/api` rate limit; it needs the peer address
/// from `ConnectInfo`, which in-process test clients do not provide.
pub fn build_router(state: AppState, rate_limited: bool) -> Router {
    let api_router = if rate_limited {
        rate_limit::apply(api_routes(), state.behind_proxy)
    } else {
        api_routes()
    };

    Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state, true))
}
