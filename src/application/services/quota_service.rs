//! Per-identity creation quota.

use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::Identity;
use crate::domain::repositories::{AccountRepository, LinkRepository};
use crate::error::AppError;

/// Default number of links a single guest may create.
pub const DEFAULT_MAX_GUEST_URLS: i64 = 2;

/// Decides whether an identity may create another link.
///
/// The limit is soft: the count and the following insert are not atomic, so
/// two concurrent requests from the same guest can both pass.
pub struct QuotaService {
    link_repository: Arc<dyn LinkRepository>,
    account_repository: Arc<dyn AccountRepository>,
    max_guest_urls: i64,
}

impl QuotaService {
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        account_repository: Arc<dyn AccountRepository>,
        max_guest_urls: i64,
    ) -> Self {
        Self {
            link_repository,
            account_repository,
            max_guest_urls,
        }
    }

    /// Checks the quota for `identity`.
    ///
    /// # Errors
    ///
    /// - [`AppError::QuotaExceeded`] if a guest already owns `max_guest_urls` links
    /// - [`AppError::NotFound`] if an authenticated identity has no account
    /// - [`AppError::Unavailable`] if the store cannot answer
    pub async fn check(&self, identity: &Identity) -> Result<(), AppError> {
        match identity {
            Identity::Guest(token) => {
                let owned = self.link_repository.count_by_owner(token).await?;
                if owned >= self.max_guest_urls {
                    tracing::info!("Guest quota reached for {}", token);
                    return Err(AppError::quota_exceeded(
                        "Guest link limit reached, sign in to create more",
                        json!({ "limit": self.max_guest_urls, "owned": owned }),
                    ));
                }
                Ok(())
            }
            Identity::Authenticated(email) => {
                if !self.account_repository.identity_exists(email).await? {
                    return Err(AppError::not_found(
                        "Account not found",
                        json!({ "identity": email }),
                    ));
                }
                Ok(())
            }
        }
    }

    pub fn max_guest_urls(&self) -> i64 {
        self.max_guest_urls
    }
}
