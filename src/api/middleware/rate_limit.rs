//! Per-client rate limiting using the token bucket algorithm.

use axum::Router;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Sustained requests per second allowed per client.
const PER_SECOND: u64 = 2;

/// Requests a client may burst before being throttled.
const BURST_SIZE: u32 = 100;

/// Applies the rate limit to every route of `router`.
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Key Extraction
///
/// - `behind_proxy = false`: the socket peer address
/// - `behind_proxy = true`: `X-Forwarded-For`, `X-Real-IP` or `Forwarded`,
///   falling back to the peer address
///
/// # Example
///
/// ```rust,ignore
/// let api = rate_limit::apply(api_routes(), config.behind_proxy);
/// ```
pub fn apply<S>(router: Router<S>, behind_proxy: bool) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    if behind_proxy {
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(SmartIpKeyExtractor)
                .per_second(PER_SECOND)
                .burst_size(BURST_SIZE)
                .finish()
                .expect("rate limit quota is non-zero"),
        );
        router.layer(GovernorLayer::new(governor_conf))
    } else {
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(PeerIpKeyExtractor)
                .per_second(PER_SECOND)
                .burst_size(BURST_SIZE)
                .finish()
                .expect("rate limit quota is non-zero"),
        );
        router.layer(GovernorLayer::new(governor_conf))
    }
}
