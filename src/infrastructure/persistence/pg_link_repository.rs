//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{Click, NewShortLink, ShortLink, UserAgentSummary};
use crate::domain::repositories::{LinkRepository, StoreError, StoreResult};
use crate::utils::db_error::{is_unique_violation_on_code, unavailable};

#[derive(FromRow)]
struct LinkRow {
    code: String,
    owner_id: String,
    original_url: String,
    created_at: DateTime<Utc>,
    click_count: i64,
    disabled: bool,
}

impl From<LinkRow> for ShortLink {
    fn from(r: LinkRow) -> Self {
        ShortLink::new(
            r.code,
            r.owner_id,
            r.original_url,
            r.created_at,
            r.click_count,
            r.disabled,
        )
    }
}

#[derive(FromRow)]
struct ClickRow {
    code: String,
    ip: String,
    browser: String,
    device: String,
    device_class: String,
    clicked_at: DateTime<Utc>,
}

impl From<ClickRow> for Click {
    fn from(r: ClickRow) -> Self {
        Click::new(
            r.code,
            r.ip,
            UserAgentSummary::new(r.browser, r.device, r.device_class),
            r.clicked_at,
        )
    }
}

/// PostgreSQL repository for links and their click log.
///
/// Uses SQLx prepared statements for SQL injection protection.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> StoreResult<ShortLink> {
        if !new_link.is_guest {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                    .bind(&new_link.owner_id)
                    .fetch_one(self.pool.as_ref())
                    .await
                    .map_err(unavailable)?;

            if !exists {
                return Err(StoreError::NotFound);
            }
        }

        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (code, owner_id, is_guest, original_url)
            VALUES ($1, $2, $3, $4)
            RETURNING code, owner_id, original_url, created_at, click_count, disabled
            "#,
        )
        .bind(&new_link.code)
        .bind(&new_link.owner_id)
        .bind(new_link.is_guest)
        .bind(&new_link.original_url)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| {
            if is_unique_violation_on_code(&e) {
                StoreError::DuplicateCode(new_link.code.clone())
            } else {
                unavailable(e)
            }
        })?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> StoreResult<Option<ShortLink>> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT code, owner_id, original_url, created_at, click_count, disabled
            FROM links
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(unavailable)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_owner_and_url(
        &self,
        owner_id: &str,
        long_url: &str,
    ) -> StoreResult<Option<ShortLink>> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT code, owner_id, original_url, created_at, click_count, disabled
            FROM links
            WHERE owner_id = $1 AND original_url = $2
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(owner_id)
        .bind(long_url)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(unavailable)?;

        Ok(row.map(Into::into))
    }

    async fn list_by_owner(&self, owner_id: &str) -> StoreResult<Vec<ShortLink>> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT code, owner_id, original_url, created_at, click_count, disabled
            FROM links
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(unavailable)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(
        &self,
        code: &str,
        long_url: Option<String>,
        click: Option<Click>,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(unavailable)?;

        let increment: i64 = if click.is_some() { 1 } else { 0 };
        let updated = sqlx::query(
            r#"
            UPDATE links
            SET original_url = COALESCE($2, original_url),
                click_count = click_count + $3
            WHERE code = $1
            "#,
        )
        .bind(code)
        .bind(long_url)
        .bind(increment)
        .execute(&mut *tx)
        .await
        .map_err(unavailable)?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        if let Some(click) = click {
            sqlx::query(
                r#"
                INSERT INTO link_clicks (code, ip, browser, device, device_class, clicked_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(code)
            .bind(&click.ip)
            .bind(&click.user_agent.browser)
            .bind(&click.user_agent.device)
            .bind(&click.user_agent.device_class)
            .bind(click.clicked_at)
            .execute(&mut *tx)
            .await
            .map_err(unavailable)?;
        }

        tx.commit().await.map_err(unavailable)?;
        Ok(())
    }

    async fn set_disabled(&self, code: &str, disabled: bool) -> StoreResult<()> {
        let updated = sqlx::query("UPDATE links SET disabled = $2 WHERE code = $1")
            .bind(code)
            .bind(disabled)
            .execute(self.pool.as_ref())
            .await
            .map_err(unavailable)?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn count_by_owner(&self, owner_id: &str) -> StoreResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(unavailable)
    }

    async fn list_clicks(&self, code: &str) -> StoreResult<Vec<Click>> {
        let rows = sqlx::query_as::<_, ClickRow>(
            r#"
            SELECT code, ip, browser, device, device_class, clicked_at
            FROM link_clicks
            WHERE code = $1
            ORDER BY clicked_at, id
            "#,
        )
        .bind(code)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(unavailable)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
