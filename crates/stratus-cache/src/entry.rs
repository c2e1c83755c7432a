//! Cache entry envelope.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A value as written to the store, wrapped with its freshness window.
///
/// Entries are replaced wholesale, never mutated in place. `stored_at + ttl`
/// strictly bounds validity: the engine checks expiry itself and never
/// serves an entry past it, even if the store has not evicted it yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// When the entry was written.
    pub stored_at: DateTime<Utc>,
    /// Time-to-live in milliseconds.
    pub ttl_ms: u64,
    /// The encoded value.
    pub payload: serde_json::Value,
}

impl CacheEntry {
    /// Creates an entry stored at the given instant.
    #[must_use]
    pub fn new(payload: serde_json::Value, stored_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            stored_at,
            ttl_ms: ttl.as_millis().min(u128::from(u64::MAX)) as u64,
            payload,
        }
    }

    /// The instant at which this entry stops being servable.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.stored_at
            + ChronoDuration::try_milliseconds(self.ttl_ms as i64)
                .unwrap_or_else(ChronoDuration::zero)
    }

    /// Whether the entry may still be served at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }
}
