//! In-process read-through cache for redirect lookups.

use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use metrics::counter;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::entities::ShortLink;
use crate::domain::repositories::{LinkRepository, StoreResult};

/// Default age after which an entry is dropped by the sweep.
pub const DEFAULT_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Default pause between two sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(2 * 60 * 60);

/// Default age after which a hit re-reads the store before answering.
pub const DEFAULT_REVALIDATE_AFTER: Duration = Duration::from_secs(30);

/// A cached record snapshot.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub link: ShortLink,
    /// Last time the snapshot was loaded from or written through to the store.
    pub last_refreshed: Instant,
}

impl CacheEntry {
    fn fresh(link: ShortLink) -> Self {
        Self {
            link,
            last_refreshed: Instant::now(),
        }
    }
}

/// Shared result of one store read, handed to every coalesced caller.
type Flight = Arc<OnceCell<StoreResult<Option<ShortLink>>>>;

/// A caller's stake in a flight. The last one to leave, finished or
/// cancelled, deregisters the flight.
struct FlightGuard<'a> {
    in_flight: &'a DashMap<String, Flight>,
    code: &'a str,
    flight: Flight,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        // map + this guard; joining takes the same shard lock
        self.in_flight.remove_if(self.code, |_, registered| {
            Arc::ptr_eq(registered, &self.flight) && Arc::strong_count(registered) <= 2
        });
    }
}

/// Bounded, time-evicted mapping from code to record.
///
/// Reads never wait on each other: the map is sharded and a hit only takes a
/// shard read lock. Concurrent misses for the same code share a single store
/// read (single-flight). Eviction is a memory bound only; a miss is always
/// resolvable through the repository.
///
/// Edits made through this process are applied to the cache directly. Writes
/// from elsewhere (the admin CLI, another instance) become visible once the
/// entry is older than `revalidate_after`: such a hit is answered by a fresh
/// store read, shared like a miss.
///
/// Lock order is `in_flight` before `entries`. Fills insert only while their
/// flight is still registered, and every edit path deregisters the flight
/// first, so a fill racing an edit never resurrects the pre-edit snapshot.
/// A flight stays registered until its last waiter returns or is dropped.
pub struct RedirectCache {
    entries: DashMap<String, CacheEntry>,
    in_flight: DashMap<String, Flight>,
    repository: Arc<dyn LinkRepository>,
    ttl: Duration,
    revalidate_after: Duration,
}

impl RedirectCache {
    /// Creates an empty cache reading through `repository`.
    pub fn new(repository: Arc<dyn LinkRepository>, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            in_flight: DashMap::new(),
            repository,
            ttl,
            revalidate_after: DEFAULT_REVALIDATE_AFTER,
        }
    }

    /// Sets how old a snapshot may get before a hit re-reads the store.
    pub fn with_revalidate_after(mut self, revalidate_after: Duration) -> Self {
        self.revalidate_after = revalidate_after;
        self
    }

    /// Resolves a code, reading through to the store on a miss.
    ///
    /// Returns `Ok(None)` when the store has no such record. Disabled records
    /// are returned as-is; refusing them is the caller's job.
    ///
    /// Dropping the returned future leaves the cache untouched: the entry is
    /// only inserted once the store read has fully completed.
    pub async fn resolve(&self, code: &str) -> StoreResult<Option<ShortLink>> {
        match self.entries.get(code) {
            Some(entry) if entry.last_refreshed.elapsed() < self.revalidate_after => {
                counter!("redirect_cache_hits_total").increment(1);
                return Ok(Some(entry.link.clone()));
            }
            Some(_) => counter!("redirect_cache_revalidations_total").increment(1),
            None => counter!("redirect_cache_misses_total").increment(1),
        }

        let guard = FlightGuard {
            in_flight: &self.in_flight,
            code,
            flight: self
                .in_flight
                .entry(code.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone(),
        };

        guard
            .flight
            .get_or_init(|| self.fill(code, &guard.flight))
            .await
            .clone()
    }

    /// Store read performed by whichever caller leads the flight.
    ///
    /// A stale snapshot is served as-is if the store cannot be reached.
    async fn fill(&self, code: &str, flight: &Flight) -> StoreResult<Option<ShortLink>> {
        if let Some(entry) = self.entries.get(code) {
            if entry.last_refreshed.elapsed() < self.revalidate_after {
                return Ok(Some(entry.link.clone()));
            }
        }

        counter!("redirect_cache_store_reads_total").increment(1);
        let link = match self.repository.find_by_code(code).await {
            Ok(link) => link,
            Err(e) => {
                if let Some(entry) = self.entries.get(code) {
                    warn!("Revalidation of {} failed, serving stale entry: {}", code, e);
                    return Ok(Some(entry.link.clone()));
                }
                return Err(e);
            }
        };

        let Some(registered) = self.in_flight.get(code) else {
            return Ok(link);
        };
        if !Arc::ptr_eq(registered.value(), flight) {
            return Ok(link);
        }

        let Some(mut link) = link else {
            if self.entries.remove(code).is_some() {
                debug!("Cache DROP (gone from store): {}", code);
            }
            return Ok(None);
        };

        match self.entries.entry(code.to_string()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                // hits not yet persisted by the click worker
                link.click_count = link.click_count.max(entry.link.click_count);
                entry.link = link.clone();
                entry.last_refreshed = Instant::now();
                debug!("Cache REVALIDATE: {}", code);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CacheEntry::fresh(link.clone()));
                debug!("Cache FILL: {}", code);
            }
        }

        Ok(Some(link))
    }

    /// Write-through: caches a record that was just persisted.
    pub fn insert(&self, link: ShortLink) {
        self.in_flight.remove(&link.code);
        debug!("Cache SET: {}", link.code);
        self.entries
            .insert(link.code.clone(), CacheEntry::fresh(link));
    }

    /// Bumps the cached click counter without touching the store.
    ///
    /// Returns false if the code is not cached.
    pub fn record_hit(&self, code: &str) -> bool {
        match self.entries.get_mut(code) {
            Some(mut entry) => {
                entry.link.click_count += 1;
                true
            }
            None => false,
        }
    }

    /// Applies an edit to the cached snapshot, if any.
    ///
    /// Returns false if the code is not cached.
    pub fn update<F>(&self, code: &str, mutator: F) -> bool
    where
        F: FnOnce(&mut ShortLink),
    {
        self.in_flight.remove(code);
        match self.entries.get_mut(code) {
            Some(mut entry) => {
                mutator(&mut entry.link);
                entry.last_refreshed = Instant::now();
                debug!("Cache UPDATE: {}", code);
                true
            }
            None => false,
        }
    }

    /// Drops a cached snapshot so the next resolve reads the store.
    pub fn invalidate(&self, code: &str) {
        self.in_flight.remove(code);
        if self.entries.remove(code).is_some() {
            debug!("Cache INVALIDATE: {}", code);
        }
    }

    /// Returns the cached snapshot without reading through.
    pub fn peek(&self, code: &str) -> Option<ShortLink> {
        self.entries.get(code).map(|e| e.link.clone())
    }

    /// Removes every entry older than the TTL. Returns how many were removed.
    ///
    /// Shards are locked one at a time, so lookups on other shards proceed
    /// while a sweep is running.
    pub fn sweep_expired(&self) -> usize {
        let ttl = self.ttl;
        let mut removed = 0;

        self.entries.retain(|_, entry| {
            let keep = entry.last_refreshed.elapsed() <= ttl;
            if !keep {
                removed += 1;
            }
            keep
        });

        counter!("redirect_cache_evictions_total").increment(removed as u64);
        removed
    }

    /// Starts the periodic sweep.
    ///
    /// The task holds only a weak reference and ends on its own once the
    /// cache is dropped; the returned handle stops it earlier.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> CacheSweeper {
        let cache: Weak<Self> = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let removed = cache.sweep_expired();
                if removed > 0 {
                    info!(
                        "Cache sweep removed {} entries ({} remaining)",
                        removed,
                        cache.len()
                    );
                }
            }
        });

        CacheSweeper { handle }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Handle to the background sweep task. Dropping it stops the sweep.
pub struct CacheSweeper {
    handle: JoinHandle<()>,
}

impl CacheSweeper {
    /// Stops the sweep task.
    pub fn shutdown(self) {
        self.handle.abort();
        info!("Cache sweeper stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for CacheSweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
