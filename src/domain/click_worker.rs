//! Background worker that persists queued click events.

use std::sync::Arc;

use metrics::counter;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;

/// Drains the click queue until every sender is dropped.
///
/// Each event gets exactly one write attempt. Failures are logged and counted,
/// never retried: click accounting is best-effort and the durable counter is
/// only eventually consistent with the in-process cache.
///
/// At most `concurrency` writes are in flight at once.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<dyn LinkRepository>,
    concurrency: usize,
) {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let repository = repository.clone();

        tasks.spawn(async move {
            persist_click(repository.as_ref(), event).await;
            drop(permit);
        });

        while tasks.try_join_next().is_some() {}
    }

    while tasks.join_next().await.is_some() {}
    info!("Click worker stopped");
}

/// Writes a single click. Returns whether the write succeeded.
pub async fn persist_click(repository: &dyn LinkRepository, event: ClickEvent) -> bool {
    let code = event.code.clone();
    let click = event.into_click();

    match repository.update(&code, None, Some(click)).await {
        Ok(()) => {
            debug!("Recorded click for {}", code);
            true
        }
        Err(e) => {
            warn!("Failed to record click for {}: {}", code, e);
            counter!("clicks_failed_total").increment(1);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockLinkRepository, StoreError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_worker_persists_each_event_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();

        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_update()
            .withf(|code, url, click| code == "abc123" && url.is_none() && click.is_some())
            .times(3)
            .returning(move |_, _, _| {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });

        let (tx, rx) = mpsc::channel(10);
        for _ in 0..3 {
            tx.send(ClickEvent::new("abc123".into(), "1.1.1.1".into(), None))
                .await
                .unwrap();
        }
        drop(tx);

        run_click_worker(rx, Arc::new(mock_repo), 2).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failed_write_is_not_retried() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_update()
            .times(1)
            .returning(|_, _, _| Err(StoreError::Unavailable("timeout".into())));

        let (tx, rx) = mpsc::channel(10);
        tx.send(ClickEvent::new("abc123".into(), "1.1.1.1".into(), None))
            .await
            .unwrap();
        drop(tx);

        run_click_worker(rx, Arc::new(mock_repo), 1).await;
    }

    #[tokio::test]
    async fn test_persist_click_reports_failure() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_update()
            .times(1)
            .returning(|_, _, _| Err(StoreError::NotFound));

        let ok = persist_click(
            &mock_repo,
            ClickEvent::new("gone".into(), "1.1.1.1".into(), None),
        )
        .await;

        assert!(!ok);
    }
}
