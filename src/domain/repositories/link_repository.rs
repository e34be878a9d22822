//! Repository trait for short link records.

use async_trait::async_trait;

use super::StoreResult;
use crate::domain::entities::{Click, NewShortLink, ShortLink};

/// Repository interface for short link records and their click log.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::InMemoryLinkRepository`] - process-local store
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::TimeoutLinkRepository`] - deadline decorator
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`super::StoreError::DuplicateCode`] if the code is already taken.
    /// Returns [`super::StoreError::NotFound`] if the owner is unknown to the store.
    /// Returns [`super::StoreError::Unavailable`] on transport failures.
    async fn create(&self, new_link: NewShortLink) -> StoreResult<ShortLink>;

    /// Finds a link by its short code.
    async fn find_by_code(&self, code: &str) -> StoreResult<Option<ShortLink>>;

    /// Finds the link an owner already created for `long_url`, if any.
    ///
    /// Backs idempotent creation.
    async fn find_by_owner_and_url(
        &self,
        owner_id: &str,
        long_url: &str,
    ) -> StoreResult<Option<ShortLink>>;

    /// Lists all links created by an owner, newest first.
    async fn list_by_owner(&self, owner_id: &str) -> StoreResult<Vec<ShortLink>>;

    /// Updates a link's target and/or records a click.
    ///
    /// A click is appended to the click log and increments `click_count`.
    ///
    /// # Errors
    ///
    /// Returns [`super::StoreError::NotFound`] if the code does not exist.
    async fn update(
        &self,
        code: &str,
        long_url: Option<String>,
        click: Option<Click>,
    ) -> StoreResult<()>;

    /// Enables or disables a link.
    ///
    /// # Errors
    ///
    /// Returns [`super::StoreError::NotFound`] if the code does not exist.
    async fn set_disabled(&self, code: &str, disabled: bool) -> StoreResult<()>;

    /// Counts links created by an owner.
    async fn count_by_owner(&self, owner_id: &str) -> StoreResult<i64>;

    /// Returns the click log for a link, oldest first.
    async fn list_clicks(&self, code: &str) -> StoreResult<Vec<Click>>;

    /// Checks that the backing store answers.
    async fn health_check(&self) -> bool;
}
