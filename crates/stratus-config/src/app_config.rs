//! Application configuration structures.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// Redis configuration.
    #[serde(default)]
    pub redis: RedisSettings,

    /// Cache engine configuration.
    #[serde(default)]
    pub cache: CacheSettings,

    /// Refresh-ahead scheduler configuration.
    #[serde(default)]
    pub refresh: RefreshSettings,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "stratus".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Redis connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisSettings {
    /// Connection URL.
    pub url: String,
    /// Connection pool size.
    pub pool_size: usize,
    /// Whether the remote store is used at all; when false the service
    /// runs against the in-memory store.
    pub enabled: bool,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            pool_size: 16,
            enabled: true,
        }
    }
}

/// Cache engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Logical cache name, used for metrics attribution.
    pub cache_name: String,
    /// Default entry TTL in seconds.
    pub default_ttl_secs: u64,
    /// Per-call store timeout in milliseconds.
    pub store_timeout_ms: u64,
    /// Optional cap on concurrent in-flight loads; absent means unbounded.
    #[serde(default)]
    pub max_concurrent_in_flight: Option<usize>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            cache_name: "users".to_string(),
            default_ttl_secs: 300,
            store_timeout_ms: 2_000,
            max_concurrent_in_flight: None,
        }
    }
}

impl CacheSettings {
    /// Default entry TTL.
    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// Per-call store timeout.
    #[must_use]
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

/// Refresh-ahead scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshSettings {
    /// Interval between refresh cycles, in seconds.
    pub interval_secs: u64,
    /// How many hot users to refresh per cycle.
    pub top_n: usize,
    /// TTL of the cross-instance refresh lock, in seconds.
    pub lock_ttl_secs: u64,
    /// Run one refresh cycle eagerly at startup.
    pub warm_on_startup: bool,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            top_n: 10,
            lock_ttl_secs: 60,
            warm_on_startup: true,
        }
    }
}

impl RefreshSettings {
    /// Interval between refresh cycles.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// TTL of the cross-instance refresh lock.
    #[must_use]
    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_secs)
    }
}
