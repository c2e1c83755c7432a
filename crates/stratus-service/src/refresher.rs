//! Refresh-ahead scheduler.
//!
//! Periodically refreshes the cache entries of the most frequently
//! accessed users so hot reads keep hitting warm data. A store-side lock
//! (`SET NX` with a bounded TTL) ensures only one instance runs a cycle at
//! a time when several service instances share the store.

use crate::tracker::AccessTracker;
use crate::user_service::UserService;
use std::sync::Arc;
use std::time::Duration;
use stratus_cache::StoreClient;
use stratus_config::RefreshSettings;
use stratus_core::StratusResult;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

const LOCK_KEY: &str = "stratus:lock:refresh_hot_users";

/// Scheduler tuning knobs.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Interval between refresh cycles.
    pub interval: Duration,
    /// How many hot users to refresh per cycle.
    pub top_n: usize,
    /// TTL of the cross-instance lock.
    pub lock_ttl: Duration,
    /// Run one cycle eagerly when the scheduler starts.
    pub warm_on_startup: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            top_n: 10,
            lock_ttl: Duration::from_secs(60),
            warm_on_startup: true,
        }
    }
}

impl From<&RefreshSettings> for RefreshConfig {
    fn from(settings: &RefreshSettings) -> Self {
        Self {
            interval: settings.interval(),
            top_n: settings.top_n,
            lock_ttl: settings.lock_ttl(),
            warm_on_startup: settings.warm_on_startup,
        }
    }
}

/// Proactively refreshes hot users in the cache.
pub struct RefreshAheadScheduler {
    service: Arc<dyn UserService>,
    tracker: Arc<dyn AccessTracker>,
    store: Arc<dyn StoreClient>,
    config: RefreshConfig,
}

impl RefreshAheadScheduler {
    /// Creates a scheduler.
    #[must_use]
    pub fn new(
        service: Arc<dyn UserService>,
        tracker: Arc<dyn AccessTracker>,
        store: Arc<dyn StoreClient>,
        config: RefreshConfig,
    ) -> Self {
        Self {
            service,
            tracker,
            store,
            config,
        }
    }

    /// Runs one refresh cycle, returning how many users were refreshed.
    ///
    /// Returns 0 without refreshing when another instance holds the lock.
    pub async fn refresh_hot_users(&self) -> StratusResult<usize> {
        let acquired = self
            .store
            .set_nx(LOCK_KEY, b"locked", self.config.lock_ttl)
            .await?;
        if !acquired {
            info!("Another instance is refreshing hot users, skipping this cycle");
            return Ok(0);
        }

        let result = self.run_cycle().await;

        if let Err(e) = self.store.delete(LOCK_KEY).await {
            warn!("Failed to release refresh lock: {}", e);
        } else {
            debug!("Released refresh lock");
        }

        result
    }

    async fn run_cycle(&self) -> StratusResult<usize> {
        let hot_ids = self.tracker.top_accessed(self.config.top_n).await?;
        if hot_ids.is_empty() {
            info!("No hot users found to refresh at this time");
            return Ok(0);
        }

        info!("Refreshing {} hot users: {:?}", hot_ids.len(), hot_ids);
        let mut refreshed = 0;
        for id in hot_ids {
            match self.service.refresh_user(id).await {
                Ok(()) => refreshed += 1,
                // One stale id (e.g. a user removed since it got hot) must
                // not abort the rest of the cycle.
                Err(e) => warn!("Failed to refresh user {}: {}", id, e),
            }
        }
        Ok(refreshed)
    }

    /// Starts the periodic refresh loop.
    ///
    /// The loop stops when `true` is sent on `shutdown` or the sender is
    /// dropped.
    pub fn spawn(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            if self.config.warm_on_startup {
                info!("Starting cache warm-up for hot users");
                if let Err(e) = self.refresh_hot_users().await {
                    warn!("Cache warm-up failed: {}", e);
                }
            }

            let mut ticker = tokio::time::interval(self.config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick fires immediately; the warm-up already covered it.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.refresh_hot_users().await {
                            warn!("Hot user refresh cycle failed: {}", e);
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            info!("Refresh-ahead scheduler stopping");
                            break;
                        }
                    }
                }
            }
        })
    }
}
