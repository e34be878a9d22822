//! PostgreSQL implementation of account repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::{AccountRepository, StoreResult};
use crate::utils::db_error::unavailable;

/// Looks up accounts mirrored into the `users` table.
pub struct PgAccountRepository {
    pool: Arc<PgPool>,
}

impl PgAccountRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn identity_exists(&self, email: &str) -> StoreResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(unavailable)
    }
}
