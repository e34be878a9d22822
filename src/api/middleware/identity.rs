//! Request extractors for the caller's address and identity.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use serde_json::json;
use std::net::{IpAddr, SocketAddr};

use crate::domain::entities::Identity;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// The caller's IP address, honouring forwarding headers when the service
/// runs behind a trusted proxy.
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub IpAddr);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let ConnectInfo(peer) = ConnectInfo::<SocketAddr>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                AppError::bad_request("Unable to determine client address", json!({}))
            })?;

        Ok(ClientIp(client_ip(&parts.headers, peer, state.behind_proxy)))
    }
}

/// Who is calling.
///
/// The upstream authentication proxy puts the verified email into the
/// configured identity header. Requests without it are guests, keyed by
/// their client IP.
///
/// # Errors
///
/// Rejects with `400 Bad Request` if the identity header holds a malformed
/// email.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub Identity);

impl FromRequestParts<AppState> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let header = parts
            .headers
            .get(&state.identity_header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(email) = header {
            return Ok(CallerIdentity(Identity::authenticated(email)?));
        }

        let ClientIp(ip) = ClientIp::from_request_parts(parts, state).await?;
        Ok(CallerIdentity(Identity::guest(ip.to_string())?))
    }
}
