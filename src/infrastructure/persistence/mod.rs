//! Persistence port adapters.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] / [`PgAccountRepository`] - PostgreSQL via SQLx
//! - [`InMemoryLinkRepository`] / [`InMemoryAccountRepository`] - process-local
//!   stores for development and tests
//! - [`TimeoutLinkRepository`] / [`TimeoutAccountRepository`] - per-call
//!   deadline decorators wrapped around either of the above

pub mod memory_account_repository;
pub mod memory_link_repository;
pub mod pg_account_repository;
pub mod pg_link_repository;
pub mod timeout;

pub use memory_account_repository::InMemoryAccountRepository;
pub use memory_link_repository::InMemoryLinkRepository;
pub use pg_account_repository::PgAccountRepository;
pub use pg_link_repository::PgLinkRepository;
pub use timeout::{DEFAULT_STORE_TIMEOUT, TimeoutAccountRepository, TimeoutLinkRepository};
