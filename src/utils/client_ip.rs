//! Client address extraction for guest identities.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Determines the caller's IP address.
///
/// When `behind_proxy` is set, the first entry of `X-Forwarded-For` wins,
/// then `X-Real-IP`; malformed header values are ignored. Otherwise, and as
/// a fallback, the socket peer address is used.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> IpAddr {
    if behind_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());

        if let Some(ip) = forwarded {
            return ip;
        }

        let real_ip = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());

        if let Some(ip) = real_ip {
            return ip;
        }
    }

    peer.ip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "127.0.0.1:5000".parse().unwrap()
    }

    #[test]
    fn test_uses_peer_when_not_behind_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4"));

        let ip = client_ip(&headers, peer(), false);
        assert_eq!(ip.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_forwarded_for_first_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("1.2.3.4, 10.0.0.1"),
        );

        let ip = client_ip(&headers, peer(), true);
        assert_eq!(ip.to_string(), "1.2.3.4");
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("garbage"));
        headers.insert("x-real-ip", HeaderValue::from_static("::1"));

        let ip = client_ip(&headers, peer(), true);
        assert_eq!(ip.to_string(), "::1");
    }

    #[test]
    fn test_peer_fallback_behind_proxy() {
        let ip = client_ip(&HeaderMap::new(), peer(), true);
        assert_eq!(ip.to_string(), "127.0.0.1");
    }
}
