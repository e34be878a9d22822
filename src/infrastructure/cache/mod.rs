//! Caching layer for fast redirect lookups.
//!
//! [`RedirectCache`] keeps recently resolved records in process memory and
//! coalesces concurrent misses into a single store read.

mod redirect_cache;

pub use redirect_cache::{
    CacheEntry, CacheSweeper, DEFAULT_REVALIDATE_AFTER, DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL,
    RedirectCache,
};
