//! HTTP middleware and extractors for request processing and protection.
//!
//! - [`identity`] - Caller identity and client address extractors
//! - [`rate_limit`] - Per-client token bucket
//! - [`tracing`] - Request/response logging

pub mod identity;
pub mod rate_limit;
pub mod tracing;
