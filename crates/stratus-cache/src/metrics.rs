//! Cache hit/miss metrics.
//!
//! Counters live in the store itself, keyed per cache name, so every
//! instance of the service reports into the same totals. Recording is
//! fire-and-forget: a metrics write failing must never fail the request
//! that triggered it.

use crate::store::StoreClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stratus_core::StratusResult;
use tracing::warn;

const HIT_KEY_PREFIX: &str = "stratus:metrics:cache:hit:";
const MISS_KEY_PREFIX: &str = "stratus:metrics:cache:miss:";

/// Sink for cache hit/miss events, consumed by the engine.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Records a cache hit for the named cache.
    async fn record_hit(&self, cache_name: &str);

    /// Records a cache miss for the named cache.
    async fn record_miss(&self, cache_name: &str);
}

/// A point-in-time view of one cache's counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetricsSnapshot {
    /// The cache being measured.
    pub cache_name: String,
    /// Total hits recorded.
    pub hits: i64,
    /// Total misses recorded.
    pub misses: i64,
    /// Hits plus misses.
    pub total: i64,
    /// Hit rate as a whole-percent string, `"0%"` when nothing was recorded.
    pub hit_rate: String,
}

/// Store-resident cache metrics.
pub struct CacheMetrics {
    store: Arc<dyn StoreClient>,
}

impl CacheMetrics {
    /// Creates a metrics service over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        Self { store }
    }

    /// Returns the current counters for `cache_name`.
    pub async fn snapshot(&self, cache_name: &str) -> StratusResult<CacheMetricsSnapshot> {
        let hits = self.count(&hit_key(cache_name)).await?;
        let misses = self.count(&miss_key(cache_name)).await?;
        let total = hits + misses;
        let hit_rate = if total == 0 {
            "0%".to_string()
        } else {
            format!("{:.0}%", (hits as f64) / (total as f64) * 100.0)
        };

        Ok(CacheMetricsSnapshot {
            cache_name: cache_name.to_string(),
            hits,
            misses,
            total,
            hit_rate,
        })
    }

    /// Resets the counters for `cache_name`.
    pub async fn reset(&self, cache_name: &str) -> StratusResult<()> {
        self.store.delete(&hit_key(cache_name)).await?;
        self.store.delete(&miss_key(cache_name)).await?;
        Ok(())
    }

    async fn count(&self, key: &str) -> StratusResult<i64> {
        let value = self.store.get(key).await?;
        Ok(value
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(0))
    }
}

fn hit_key(cache_name: &str) -> String {
    format!("{}{}", HIT_KEY_PREFIX, cache_name)
}

fn miss_key(cache_name: &str) -> String {
    format!("{}{}", MISS_KEY_PREFIX, cache_name)
}

#[async_trait]
impl MetricsSink for CacheMetrics {
    async fn record_hit(&self, cache_name: &str) {
        if let Err(e) = self.store.incr(&hit_key(cache_name), 1).await {
            warn!("Failed to record cache hit for '{}': {}", cache_name, e);
        }
    }

    async fn record_miss(&self, cache_name: &str) {
        if let Err(e) = self.store.incr(&miss_key(cache_name), 1).await {
            warn!("Failed to record cache miss for '{}': {}", cache_name, e);
        }
    }
}
