//! HTTP server initialization and runtime setup.
//!
//! Handles store selection, service wiring, background tasks, and the Axum
//! server lifecycle.

use crate::application::services::{ClickService, LinkService, QuotaService};
use crate::config::{Config, mask_connection_string};
use crate::domain::click_event::ClickEvent;
use crate::domain::click_worker::run_click_worker;
use crate::domain::repositories::{AccountRepository, LinkRepository};
use crate::infrastructure::cache::RedirectCache;
use crate::infrastructure::persistence::{
    InMemoryAccountRepository, InMemoryLinkRepository, PgAccountRepository, PgLinkRepository,
    TimeoutAccountRepository, TimeoutLinkRepository,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use axum::http::HeaderName;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// How long the click worker may keep draining after the server stops.
const CLICK_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// The two persistence ports, before deadlines are applied.
pub struct Stores {
    pub links: Arc<dyn LinkRepository>,
    pub accounts: Arc<dyn AccountRepository>,
}

impl Stores {
    /// Process-local stores; `seed_accounts` become known identities.
    pub fn in_memory(seed_accounts: &[String]) -> Self {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        for email in seed_accounts {
            accounts.register(email.clone());
        }

        Self {
            links: Arc::new(InMemoryLinkRepository::with_accounts(accounts.clone())),
            accounts,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        let pool = Arc::new(pool);
        Self {
            links: Arc::new(PgLinkRepository::new(pool.clone())),
            accounts: Arc::new(PgAccountRepository::new(pool)),
        }
    }
}

/// Wires services and state on top of the given stores.
///
/// Every store call made by the services runs under the configured deadline.
/// Returns the receiving end of the click queue for the worker.
///
/// # Errors
///
/// Returns an error if the identity header name is invalid.
pub fn build_state(
    config: &Config,
    stores: Stores,
) -> Result<(AppState, mpsc::Receiver<ClickEvent>)> {
    let links: Arc<dyn LinkRepository> =
        Arc::new(TimeoutLinkRepository::new(stores.links, config.store_timeout()));
    let accounts: Arc<dyn AccountRepository> = Arc::new(TimeoutAccountRepository::new(
        stores.accounts,
        config.store_timeout(),
    ));

    let identity_header = HeaderName::from_bytes(config.identity_header.as_bytes())
        .with_context(|| format!("Invalid IDENTITY_HEADER '{}'", config.identity_header))?;

    let cache = Arc::new(
        RedirectCache::new(links.clone(), config.cache_ttl())
            .with_revalidate_after(config.cache_revalidate_after()),
    );
    let quota = QuotaService::new(links.clone(), accounts, config.max_guest_urls);
    let link_service = Arc::new(LinkService::new(
        links.clone(),
        quota,
        cache.clone(),
        config.allocation_settings(),
    ));

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    let click_service = Arc::new(ClickService::new(links.clone(), cache, click_tx));

    let state = AppState::new(
        link_service,
        click_service,
        links,
        identity_header,
        config.behind_proxy,
        config.public_url.clone(),
    );

    Ok((state, click_rx))
}

/// Connects to PostgreSQL, retrying with exponential backoff, and applies
/// migrations.
///
/// # Errors
///
/// Returns an error if every connection attempt fails or a migration fails.
pub async fn connect_postgres(config: &Config, database_url: &str) -> Result<PgPool> {
    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    // 200ms, 400ms, 800ms, 1.6s, 3.2s
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(100)
        .max_delay(Duration::from_secs(5))
        .map(jitter)
        .take(5);

    let pool = Retry::spawn(strategy, || async {
        options.clone().connect(database_url).await.inspect_err(|e| {
            tracing::warn!("Database connection failed, retrying: {}", e);
        })
    })
    .await
    .with_context(|| {
        format!(
            "Failed to connect to {}",
            mask_connection_string(database_url)
        )
    })?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations applied");

    Ok(pool)
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL pool with migrations, or the in-memory store
/// - Redirect cache and its periodic sweep
/// - Background click worker
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let stores = match &config.database_url {
        Some(url) => Stores::postgres(connect_postgres(&config, url).await?),
        None => {
            tracing::warn!("No database configured, using the in-memory store");
            Stores::in_memory(&config.seed_accounts)
        }
    };

    let (state, click_rx) = build_state(&config, stores)?;

    let worker = tokio::spawn(run_click_worker(
        click_rx,
        state.link_repository.clone(),
        config.click_worker_concurrency,
    ));
    tracing::info!("Click worker started");

    let sweeper = state
        .link_service
        .cache()
        .spawn_sweeper(config.cache_sweep_interval());
    tracing::info!(
        "Cache sweeper started (every {:?})",
        config.cache_sweep_interval()
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.shutdown();

    // The router (and with it every click sender) is gone; let the worker drain.
    if tokio::time::timeout(CLICK_DRAIN_TIMEOUT, worker).await.is_err() {
        tracing::warn!("Click worker did not drain within {:?}", CLICK_DRAIN_TIMEOUT);
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! { _ = ctrl_c => {}, _ = terminate => {}, }
    tracing::info!("Shutdown signal received");
}
