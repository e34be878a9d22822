//! Core domain entities.
//!
//! # Entity Types
//!
//! - [`ShortLink`] - A short code mapped to its original URL
//! - [`Click`] - A recorded visit to a short link
//! - [`Identity`] - The caller, either authenticated or a guest
//!
//! Creation inputs use separate structs (`NewShortLink`) so that store-assigned
//! fields such as `created_at` never appear in requests.

pub mod click;
pub mod identity;
pub mod link;

pub use click::{Click, UserAgentSummary};
pub use identity::Identity;
pub use link::{NewShortLink, ShortLink};
