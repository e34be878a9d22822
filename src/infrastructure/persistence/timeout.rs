//! Deadline decorators for the persistence port.
//!
//! Each call is raced against a timer; a call that does not finish in time is
//! dropped (which cancels it) and reported as [`StoreError::Unavailable`].

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::domain::entities::{Click, NewShortLink, ShortLink};
use crate::domain::repositories::{AccountRepository, LinkRepository, StoreError, StoreResult};

/// Default deadline for a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(5000);

async fn with_deadline<T, F>(deadline: Duration, operation: &'static str, fut: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!("Store call '{}' timed out after {:?}", operation, deadline);
            metrics::counter!("store_timeouts_total", "operation" => operation).increment(1);
            Err(StoreError::Unavailable(format!(
                "{operation} timed out after {}ms",
                deadline.as_millis()
            )))
        }
    }
}

/// Wraps a [`LinkRepository`] so that every call has a deadline.
pub struct TimeoutLinkRepository {
    inner: Arc<dyn LinkRepository>,
    deadline: Duration,
}

impl TimeoutLinkRepository {
    pub fn new(inner: Arc<dyn LinkRepository>, deadline: Duration) -> Self {
        Self { inner, deadline }
    }
}

#[async_trait]
impl LinkRepository for TimeoutLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> StoreResult<ShortLink> {
        with_deadline(self.deadline, "create", self.inner.create(new_link)).await
    }

    async fn find_by_code(&self, code: &str) -> StoreResult<Option<ShortLink>> {
        with_deadline(self.deadline, "find_by_code", self.inner.find_by_code(code)).await
    }

    async fn find_by_owner_and_url(
        &self,
        owner_id: &str,
        long_url: &str,
    ) -> StoreResult<Option<ShortLink>> {
        with_deadline(
            self.deadline,
            "find_by_owner_and_url",
            self.inner.find_by_owner_and_url(owner_id, long_url),
        )
        .await
    }

    async fn list_by_owner(&self, owner_id: &str) -> StoreResult<Vec<ShortLink>> {
        with_deadline(
            self.deadline,
            "list_by_owner",
            self.inner.list_by_owner(owner_id),
        )
        .await
    }

    async fn update(
        &self,
        code: &str,
        long_url: Option<String>,
        click: Option<Click>,
    ) -> StoreResult<()> {
        with_deadline(
            self.deadline,
            "update",
            self.inner.update(code, long_url, click),
        )
        .await
    }

    async fn set_disabled(&self, code: &str, disabled: bool) -> StoreResult<()> {
        with_deadline(
            self.deadline,
            "set_disabled",
            self.inner.set_disabled(code, disabled),
        )
        .await
    }

    async fn count_by_owner(&self, owner_id: &str) -> StoreResult<i64> {
        with_deadline(
            self.deadline,
            "count_by_owner",
            self.inner.count_by_owner(owner_id),
        )
        .await
    }

    async fn list_clicks(&self, code: &str) -> StoreResult<Vec<Click>> {
        with_deadline(self.deadline, "list_clicks", self.inner.list_clicks(code)).await
    }

    async fn health_check(&self) -> bool {
        tokio::time::timeout(self.deadline, self.inner.health_check())
            .await
            .unwrap_or(false)
    }
}

/// Wraps an [`AccountRepository`] so that every call has a deadline.
pub struct TimeoutAccountRepository {
    inner: Arc<dyn AccountRepository>,
    deadline: Duration,
}

impl TimeoutAccountRepository {
    pub fn new(inner: Arc<dyn AccountRepository>, deadline: Duration) -> Self {
        Self { inner, deadline }
    }
}

#[async_trait]
impl AccountRepository for TimeoutAccountRepository {
    async fn identity_exists(&self, email: &str) -> StoreResult<bool> {
        with_deadline(
            self.deadline,
            "identity_exists",
            self.inner.identity_exists(email),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockAccountRepository, MockLinkRepository};

    /// Account store that never answers.
    struct HangingAccounts;

    #[async_trait]
    impl AccountRepository for HangingAccounts {
        async fn identity_exists(&self, _email: &str) -> StoreResult<bool> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_becomes_unavailable() {
        let repo = TimeoutAccountRepository::new(Arc::new(HangingAccounts), DEFAULT_STORE_TIMEOUT);

        let err = repo.identity_exists("user@example.com").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(msg) if msg.contains("identity_exists")));
    }

    #[tokio::test]
    async fn test_fast_call_passes_through() {
        let mut mock_accounts = MockAccountRepository::new();
        mock_accounts
            .expect_identity_exists()
            .times(1)
            .returning(|_| Ok(true));

        let repo = TimeoutAccountRepository::new(Arc::new(mock_accounts), DEFAULT_STORE_TIMEOUT);
        assert!(repo.identity_exists("user@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_inner_errors_are_preserved() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_set_disabled()
            .times(1)
            .returning(|_, _| Err(StoreError::NotFound));

        let repo = TimeoutLinkRepository::new(Arc::new(mock_repo), DEFAULT_STORE_TIMEOUT);
        assert_eq!(
            repo.set_disabled("abc123", true).await.unwrap_err(),
            StoreError::NotFound
        );
    }
}
