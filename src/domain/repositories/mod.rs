//! Persistence port: the narrow interface the core uses to reach durable storage.
//!
//! These traits are implemented by adapters in `crate::infrastructure::persistence`.
//! Mock implementations are generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Short link records and their click log
//! - [`AccountRepository`] - Existence checks for authenticated identities

pub mod account_repository;
pub mod link_repository;

pub use account_repository::AccountRepository;
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;

/// Failures reported by a persistence adapter.
///
/// `Clone` so that a single store result can be handed to every caller
/// coalesced onto the same cache fill.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("short code '{0}' already exists")]
    DuplicateCode(String),

    #[error("record not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for persistence port calls.
pub type StoreResult<T> = Result<T, StoreError>;
