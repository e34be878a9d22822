//! Process-local account registry.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;

use crate::domain::repositories::{AccountRepository, StoreResult};

/// Set of known account emails, kept in memory.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    emails: RwLock<HashSet<String>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account. Returns false if it was already known.
    pub fn register(&self, email: impl Into<String>) -> bool {
        self.emails.write().insert(email.into())
    }

    pub fn contains(&self, email: &str) -> bool {
        self.emails.read().contains(email)
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn identity_exists(&self, email: &str) -> StoreResult<bool> {
        Ok(self.contains(email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_lookup() {
        let repo = InMemoryAccountRepository::new();
        assert!(!repo.identity_exists("user@example.com").await.unwrap());

        assert!(repo.register("user@example.com"));
        assert!(!repo.register("user@example.com"));

        assert!(repo.identity_exists("user@example.com").await.unwrap());
    }
}
