//! Shared application state injected into every handler.

use axum::http::HeaderName;
use std::sync::Arc;

use crate::application::services::{ClickService, LinkService};
use crate::domain::repositories::LinkRepository;

/// Handles to the core services, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub click_service: Arc<ClickService>,
    /// Used by the health check only; request paths go through the services.
    pub link_repository: Arc<dyn LinkRepository>,
    /// Header carrying the authenticated identity.
    pub identity_header: HeaderName,
    /// Whether guest addresses are read from forwarding headers.
    pub behind_proxy: bool,
    /// Externally visible origin, without a trailing slash.
    pub public_url: String,
}

impl AppState {
    pub fn new(
        link_service: Arc<LinkService>,
        click_service: Arc<ClickService>,
        link_repository: Arc<dyn LinkRepository>,
        identity_header: HeaderName,
        behind_proxy: bool,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            link_service,
            click_service,
            link_repository,
            identity_header,
            behind_proxy,
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Full address of a short link.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.public_url, code)
    }
}
