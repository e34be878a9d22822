//! Process-local implementation of link repository.
//!
//! Used when no database is configured and by the integration tests. State is
//! lost on restart.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::InMemoryAccountRepository;
use crate::domain::entities::{Click, NewShortLink, ShortLink};
use crate::domain::repositories::{LinkRepository, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    links: HashMap<String, ShortLink>,
    /// Codes in insertion order.
    order: Vec<String>,
    clicks: HashMap<String, Vec<Click>>,
}

/// In-memory link store guarded by a single `RwLock`.
///
/// Every operation holds the lock for its whole duration, so each call is
/// atomic with respect to the others.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    tables: RwLock<Tables>,
    accounts: Option<Arc<InMemoryAccountRepository>>,
}

impl InMemoryLinkRepository {
    /// Creates a store that accepts any owner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects authenticated owners unknown to `accounts`.
    pub fn with_accounts(accounts: Arc<InMemoryAccountRepository>) -> Self {
        Self {
            tables: RwLock::default(),
            accounts: Some(accounts),
        }
    }

    pub fn len(&self) -> usize {
        self.tables.read().links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> StoreResult<ShortLink> {
        if let Some(accounts) = &self.accounts {
            if !new_link.is_guest && !accounts.contains(&new_link.owner_id) {
                return Err(StoreError::NotFound);
            }
        }

        let mut tables = self.tables.write();
        if tables.links.contains_key(&new_link.code) {
            return Err(StoreError::DuplicateCode(new_link.code));
        }

        let link = ShortLink::new(
            new_link.code.clone(),
            new_link.owner_id,
            new_link.original_url,
            Utc::now(),
            0,
            false,
        );
        tables.links.insert(new_link.code.clone(), link.clone());
        tables.order.push(new_link.code);

        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> StoreResult<Option<ShortLink>> {
        Ok(self.tables.read().links.get(code).cloned())
    }

    async fn find_by_owner_and_url(
        &self,
        owner_id: &str,
        long_url: &str,
    ) -> StoreResult<Option<ShortLink>> {
        let tables = self.tables.read();
        Ok(tables
            .order
            .iter()
            .filter_map(|code| tables.links.get(code))
            .find(|link| link.is_same_target(owner_id, long_url))
            .cloned())
    }

    async fn list_by_owner(&self, owner_id: &str) -> StoreResult<Vec<ShortLink>> {
        let tables = self.tables.read();
        Ok(tables
            .order
            .iter()
            .rev()
            .filter_map(|code| tables.links.get(code))
            .filter(|link| link.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        code: &str,
        long_url: Option<String>,
        click: Option<Click>,
    ) -> StoreResult<()> {
        let mut guard = self.tables.write();
        let tables = &mut *guard;
        let link = tables.links.get_mut(code).ok_or(StoreError::NotFound)?;

        if let Some(url) = long_url {
            link.original_url = url;
        }

        if let Some(click) = click {
            link.click_count += 1;
            tables.clicks.entry(code.to_string()).or_default().push(click);
        }

        Ok(())
    }

    async fn set_disabled(&self, code: &str, disabled: bool) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let link = tables.links.get_mut(code).ok_or(StoreError::NotFound)?;
        link.disabled = disabled;
        Ok(())
    }

    async fn count_by_owner(&self, owner_id: &str) -> StoreResult<i64> {
        let tables = self.tables.read();
        Ok(tables
            .links
            .values()
            .filter(|link| link.owner_id == owner_id)
            .count() as i64)
    }

    async fn list_clicks(&self, code: &str) -> StoreResult<Vec<Click>> {
        Ok(self
            .tables
            .read()
            .clicks
            .get(code)
            .cloned()
            .unwrap_or_default())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::UserAgentSummary;

    fn new_link(code: &str, owner: &str, url: &str) -> NewShortLink {
        NewShortLink {
            code: code.to_string(),
            owner_id: owner.to_string(),
            original_url: url.to_string(),
            is_guest: true,
        }
    }

    fn click(code: &str) -> Click {
        Click::new(
            code.to_string(),
            "10.0.0.1".to_string(),
            UserAgentSummary::new("Chrome", "Linux", "desktop"),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryLinkRepository::new();
        let created = repo
            .create(new_link("abc123", "1.2.3.4", "https://example.com/a"))
            .await
            .unwrap();

        assert_eq!(created.click_count, 0);
        assert!(!created.disabled);

        let found = repo.find_by_code("abc123").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(repo.find_by_code("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let repo = InMemoryLinkRepository::new();
        repo.create(new_link("abc123", "a", "https://example.com/a"))
            .await
            .unwrap();

        let err = repo
            .create(new_link("abc123", "b", "https://example.com/b"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateCode("abc123".to_string()));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_account_rejected() {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        accounts.register("known@example.com");
        let repo = InMemoryLinkRepository::with_accounts(accounts);

        let mut link = new_link("abc123", "ghost@example.com", "https://example.com/a");
        link.is_guest = false;
        assert_eq!(repo.create(link).await.unwrap_err(), StoreError::NotFound);

        let mut link = new_link("abc123", "known@example.com", "https://example.com/a");
        link.is_guest = false;
        assert!(repo.create(link).await.is_ok());
    }

    #[tokio::test]
    async fn test_owner_queries() {
        let repo = InMemoryLinkRepository::new();
        repo.create(new_link("first1", "a", "https://example.com/1"))
            .await
            .unwrap();
        repo.create(new_link("secnd2", "a", "https://example.com/2"))
            .await
            .unwrap();
        repo.create(new_link("other3", "b", "https://example.com/1"))
            .await
            .unwrap();

        assert_eq!(repo.count_by_owner("a").await.unwrap(), 2);
        assert_eq!(repo.count_by_owner("nobody").await.unwrap(), 0);

        let listed = repo.list_by_owner("a").await.unwrap();
        let codes: Vec<_> = listed.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["secnd2", "first1"]);

        let found = repo
            .find_by_owner_and_url("b", "https://example.com/1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.code, "other3");
    }

    #[tokio::test]
    async fn test_update_url_and_click() {
        let repo = InMemoryLinkRepository::new();
        repo.create(new_link("abc123", "a", "https://example.com/a"))
            .await
            .unwrap();

        repo.update("abc123", Some("https://example.com/new".into()), None)
            .await
            .unwrap();
        repo.update("abc123", None, Some(click("abc123")))
            .await
            .unwrap();
        repo.update("abc123", None, Some(click("abc123")))
            .await
            .unwrap();

        let link = repo.find_by_code("abc123").await.unwrap().unwrap();
        assert_eq!(link.original_url, "https://example.com/new");
        assert_eq!(link.click_count, 2);
        assert_eq!(repo.list_clicks("abc123").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_unknown_code() {
        let repo = InMemoryLinkRepository::new();
        let err = repo.update("missing", None, Some(click("missing"))).await;
        assert_eq!(err.unwrap_err(), StoreError::NotFound);
        assert!(repo.list_clicks("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_disabled() {
        let repo = InMemoryLinkRepository::new();
        repo.create(new_link("abc123", "a", "https://example.com/a"))
            .await
            .unwrap();

        repo.set_disabled("abc123", true).await.unwrap();
        assert!(repo.find_by_code("abc123").await.unwrap().unwrap().disabled);

        assert_eq!(
            repo.set_disabled("missing", true).await.unwrap_err(),
            StoreError::NotFound
        );
    }
}
