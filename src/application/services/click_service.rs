//! Click recording and click history.

use std::sync::Arc;

use metrics::counter;
use serde_json::json;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::{Click, Identity};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::RedirectCache;

/// Default bound of the click queue.
pub const DEFAULT_CLICK_QUEUE_CAPACITY: usize = 10_000;

/// Hands redirect events to the background worker and serves click history.
///
/// Recording never blocks and never fails: the cached counter is bumped in
/// place and the event is queued, or dropped if the queue is full.
pub struct ClickService {
    link_repository: Arc<dyn LinkRepository>,
    cache: Arc<RedirectCache>,
    click_tx: mpsc::Sender<ClickEvent>,
}

impl ClickService {
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        cache: Arc<RedirectCache>,
        click_tx: mpsc::Sender<ClickEvent>,
    ) -> Self {
        Self {
            link_repository,
            cache,
            click_tx,
        }
    }

    /// Records a redirect.
    pub fn record_click(&self, event: ClickEvent) {
        self.cache.record_hit(&event.code);

        match self.click_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                counter!("clicks_dropped_total", "reason" => "full").increment(1);
                warn!("Click queue full, dropping click for {}", event.code);
            }
            Err(TrySendError::Closed(event)) => {
                counter!("clicks_dropped_total", "reason" => "closed").increment(1);
                warn!("Click worker gone, dropping click for {}", event.code);
            }
        }
    }

    /// Returns the click log of one of the caller's links, oldest first.
    ///
    /// # Errors
    ///
    /// - [`AppError::Unauthorized`] for guests
    /// - [`AppError::NotFound`] for unknown codes and other owners' links
    pub async fn get_click_history(
        &self,
        identity: &Identity,
        code: &str,
    ) -> Result<Vec<Click>, AppError> {
        identity.validate()?;
        if identity.is_guest() {
            return Err(AppError::unauthorized("Sign in to view click history"));
        }

        let owned = self
            .cache
            .resolve(code)
            .await?
            .is_some_and(|link| link.owner_id == identity.owner_id());
        if !owned {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "code": code }),
            ));
        }

        Ok(self.link_repository.list_clicks(code).await?)
    }

    /// Free slots in the click queue.
    pub fn queue_available(&self) -> usize {
        self.click_tx.capacity()
    }

    pub fn queue_capacity(&self) -> usize {
        self.click_tx.max_capacity()
    }

    /// True while the worker still holds the receiving end.
    pub fn worker_alive(&self) -> bool {
        !self.click_tx.is_closed()
    }
}
