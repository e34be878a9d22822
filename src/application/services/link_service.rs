//! Link creation, resolution and editing.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use super::QuotaService;
use crate::domain::entities::{Identity, NewShortLink, ShortLink};
use crate::domain::repositories::{LinkRepository, StoreError};
use crate::error::AppError;
use crate::infrastructure::cache::RedirectCache;
use crate::utils::code_generator::{
    DEFAULT_CODE_LENGTH, DEFAULT_MAX_ATTEMPTS, candidate_code, validate_custom_code,
};
use crate::utils::url_validator::validate_long_url;

/// Tunables for code allocation.
#[derive(Debug, Clone)]
pub struct AllocationSettings {
    pub code_length: usize,
    pub max_attempts: usize,
    /// Lowercase URL schemes accepted for long URLs.
    pub allowed_schemes: Vec<String>,
}

impl Default for AllocationSettings {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            allowed_schemes: vec!["https".to_string()],
        }
    }
}

/// Service for creating, resolving and editing short links.
///
/// Creation runs validation, the quota check and code allocation, then writes
/// the new record through to the redirect cache so that an immediate resolve
/// observes it.
pub struct LinkService {
    link_repository: Arc<dyn LinkRepository>,
    quota: QuotaService,
    cache: Arc<RedirectCache>,
    settings: AllocationSettings,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        quota: QuotaService,
        cache: Arc<RedirectCache>,
        settings: AllocationSettings,
    ) -> Self {
        Self {
            link_repository,
            quota,
            cache,
            settings,
        }
    }

    /// Creates a short link for `long_url`.
    ///
    /// # Code allocation
    ///
    /// - With `custom_code`: the code is validated and inserted as-is. A taken
    ///   code is a [`AppError::BadRequest`], never retried.
    /// - Otherwise: an existing link of the same owner for the same URL is
    ///   returned unchanged, before the quota is consulted. Failing that, up to
    ///   `max_attempts` candidates are tried, starting with the URL's
    ///   fingerprint.
    ///
    /// # Errors
    ///
    /// - [`AppError::BadRequest`] for a malformed identity, URL or custom code,
    ///   a guest asking for a custom code, or a taken custom code
    /// - [`AppError::QuotaExceeded`] / [`AppError::NotFound`] from the quota check
    /// - [`AppError::AllocationExhausted`] when every candidate collided
    /// - [`AppError::Unavailable`] when the store keeps failing
    pub async fn create_short_link(
        &self,
        identity: &Identity,
        long_url: &str,
        custom_code: Option<&str>,
    ) -> Result<ShortLink, AppError> {
        identity.validate()?;
        self.validate_url(long_url)?;

        let link = match custom_code {
            Some(code) => {
                self.quota.check(identity).await?;
                self.create_with_custom_code(identity, long_url, code).await?
            }
            None => {
                // Re-requesting an owned URL never counts against the quota.
                if let Some(existing) = self
                    .link_repository
                    .find_by_owner_and_url(identity.owner_id(), long_url)
                    .await?
                {
                    debug!("Returning existing link {} for {}", existing.code, long_url);
                    return Ok(existing);
                }
                self.quota.check(identity).await?;
                self.create_with_generated_code(identity, long_url).await?
            }
        };

        self.cache.insert(link.clone());
        info!("Created short link {} -> {}", link.code, link.original_url);

        Ok(link)
    }

    async fn create_with_custom_code(
        &self,
        identity: &Identity,
        long_url: &str,
        code: &str,
    ) -> Result<ShortLink, AppError> {
        if identity.is_guest() {
            return Err(AppError::bad_request(
                "Sign in to choose a custom short code",
                json!({ "code": code }),
            ));
        }

        validate_custom_code(code)?;

        if self.link_repository.find_by_code(code).await?.is_some() {
            return Err(AppError::bad_request(
                "Short code already exists",
                json!({ "code": code }),
            ));
        }

        let link = self
            .link_repository
            .create(self.new_link(identity, long_url, code.to_string()))
            .await?;

        Ok(link)
    }

    async fn create_with_generated_code(
        &self,
        identity: &Identity,
        long_url: &str,
    ) -> Result<ShortLink, AppError> {
        let mut attempt = 0;
        let mut retried_unavailable = false;
        let mut code = candidate_code(long_url, attempt, self.settings.code_length);

        while attempt < self.settings.max_attempts {
            match self
                .link_repository
                .create(self.new_link(identity, long_url, code.clone()))
                .await
            {
                Ok(link) => return Ok(link),
                Err(StoreError::DuplicateCode(_)) => {
                    if let Some(existing) = self.link_repository.find_by_code(&code).await? {
                        if existing.is_same_target(identity.owner_id(), long_url) {
                            debug!("Concurrent create already produced {}", code);
                            return Ok(existing);
                        }
                    }
                    debug!("Code {} taken (attempt {})", code, attempt + 1);
                }
                Err(StoreError::Unavailable(reason)) if !retried_unavailable => {
                    warn!("Insert of {} failed, retrying once: {}", code, reason);
                    retried_unavailable = true;
                    continue;
                }
                Err(e) => return Err(e.into()),
            }

            attempt += 1;
            code = candidate_code(long_url, attempt, self.settings.code_length);
        }

        warn!(
            "Gave up allocating a code for {} after {} attempts",
            long_url, self.settings.max_attempts
        );
        Err(AppError::allocation_exhausted(
            "Failed to allocate a unique short code",
            json!({ "attempts": self.settings.max_attempts }),
        ))
    }

    fn new_link(&self, identity: &Identity, long_url: &str, code: String) -> NewShortLink {
        NewShortLink {
            code,
            owner_id: identity.owner_id().to_string(),
            original_url: long_url.to_string(),
            is_guest: identity.is_guest(),
        }
    }

    fn validate_url(&self, long_url: &str) -> Result<(), AppError> {
        validate_long_url(long_url, &self.settings.allowed_schemes).map_err(|e| {
            AppError::bad_request("Invalid URL", json!({ "reason": e.to_string() }))
        })
    }

    /// Resolves a code through the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown codes.
    pub async fn resolve(&self, code: &str) -> Result<ShortLink, AppError> {
        self.cache
            .resolve(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }

    /// Resolves a code for redirecting, refusing disabled links.
    pub async fn resolve_for_redirect(&self, code: &str) -> Result<ShortLink, AppError> {
        let link = self.resolve(code).await?;
        if link.disabled {
            return Err(AppError::disabled(
                "Short link is disabled",
                json!({ "code": code }),
            ));
        }
        Ok(link)
    }

    /// Returns one of the caller's links, regardless of its disabled flag.
    ///
    /// # Errors
    ///
    /// - [`AppError::Unauthorized`] for guests
    /// - [`AppError::NotFound`] if the code is unknown or owned by someone else
    pub async fn get_link(&self, identity: &Identity, code: &str) -> Result<ShortLink, AppError> {
        identity.validate()?;
        if identity.is_guest() {
            return Err(AppError::unauthorized("Sign in to view link details"));
        }

        let link = self.resolve(code).await?;
        if link.owner_id != identity.owner_id() {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "code": code }),
            ));
        }
        Ok(link)
    }

    /// Lists the caller's links, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for guests.
    pub async fn list_links_for_owner(
        &self,
        identity: &Identity,
    ) -> Result<Vec<ShortLink>, AppError> {
        identity.validate()?;
        if identity.is_guest() {
            return Err(AppError::unauthorized("Sign in to list your links"));
        }

        Ok(self
            .link_repository
            .list_by_owner(identity.owner_id())
            .await?)
    }

    /// Changes a link's target and/or disabled flag.
    ///
    /// The store is written first; the cached snapshot is then edited in place
    /// (or dropped if a store write failed half-way).
    ///
    /// # Errors
    ///
    /// - [`AppError::BadRequest`] if neither field is given or the URL is invalid
    /// - [`AppError::NotFound`] if the code is unknown or owned by someone else
    pub async fn update_link(
        &self,
        identity: &Identity,
        code: &str,
        new_url: Option<&str>,
        disable: Option<bool>,
    ) -> Result<ShortLink, AppError> {
        identity.validate()?;

        if new_url.is_none() && disable.is_none() {
            return Err(AppError::bad_request(
                "Nothing to update",
                json!({ "fields": ["longURL", "disable"] }),
            ));
        }

        if let Some(url) = new_url {
            self.validate_url(url)?;
        }

        let mut link = self
            .link_repository
            .find_by_code(code)
            .await?
            .filter(|l| l.owner_id == identity.owner_id())
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))?;

        if let Err(e) = self.write_update(code, new_url, disable).await {
            self.cache.invalidate(code);
            return Err(e.into());
        }

        if let Some(url) = new_url {
            link.original_url = url.to_string();
        }
        if let Some(disabled) = disable {
            link.disabled = disabled;
        }

        let cached = self.cache.update(code, |cached| {
            if let Some(url) = new_url {
                cached.original_url = url.to_string();
            }
            if let Some(disabled) = disable {
                cached.disabled = disabled;
            }
        });
        if !cached {
            self.cache.invalidate(code);
        }

        info!("Updated short link {}", code);
        Ok(link)
    }

    async fn write_update(
        &self,
        code: &str,
        new_url: Option<&str>,
        disable: Option<bool>,
    ) -> Result<(), StoreError> {
        if let Some(url) = new_url {
            self.link_repository
                .update(code, Some(url.to_string()), None)
                .await?;
        }
        if let Some(disabled) = disable {
            self.link_repository.set_disabled(code, disabled).await?;
        }
        Ok(())
    }

    pub fn cache(&self) -> &Arc<RedirectCache> {
        &self.cache
    }
}
