//! Hot-key access tracking.
//!
//! Every source fetch bumps the user's score in a store-side sorted set;
//! the refresh-ahead scheduler reads the top of that set to decide which
//! users are worth keeping warm. Stale users age out through the set's
//! expiry rather than explicit cleanup.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use stratus_cache::StoreClient;
use stratus_core::{StratusResult, UserId};
use tracing::warn;

const HOT_USERS_KEY: &str = "stratus:tracker:hot_users";

/// Default retention for access scores (1 hour).
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(3600);

/// Records and ranks user accesses.
#[async_trait]
pub trait AccessTracker: Send + Sync {
    /// Records one access to `id`. Fire-and-forget: tracking failures are
    /// logged, never surfaced to the request that triggered them.
    async fn record_access(&self, id: UserId);

    /// Returns up to `count` user ids, most accessed first.
    async fn top_accessed(&self, count: usize) -> StratusResult<Vec<UserId>>;
}

/// Access tracker backed by a store-side sorted set.
pub struct StoreAccessTracker {
    store: Arc<dyn StoreClient>,
    retention: Duration,
}

impl StoreAccessTracker {
    /// Creates a tracker with the default retention.
    #[must_use]
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        Self {
            store,
            retention: DEFAULT_RETENTION,
        }
    }

    /// Creates a tracker with a custom score retention.
    #[must_use]
    pub fn with_retention(store: Arc<dyn StoreClient>, retention: Duration) -> Self {
        Self { store, retention }
    }
}

#[async_trait]
impl AccessTracker for StoreAccessTracker {
    async fn record_access(&self, id: UserId) {
        let member = id.to_string();
        if let Err(e) = self.store.zincr(HOT_USERS_KEY, &member, 1.0).await {
            warn!("Failed to record access for user {}: {}", id, e);
            return;
        }
        // Refresh the expiry so the whole set ages out together.
        if let Err(e) = self.store.expire(HOT_USERS_KEY, self.retention).await {
            warn!("Failed to refresh hot-user retention: {}", e);
        }
    }

    async fn top_accessed(&self, count: usize) -> StratusResult<Vec<UserId>> {
        let members = self.store.ztop(HOT_USERS_KEY, count).await?;
        Ok(members
            .into_iter()
            .filter_map(|member| match member.parse::<UserId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!("Ignoring non-numeric hot-user member '{}'", member);
                    None
                }
            })
            .collect())
    }
}
