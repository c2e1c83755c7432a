//! Cache store client.
//!
//! A thin transport adapter over a remote key-value store. The store is
//! treated as an opaque byte store; side effects are confined to it and no
//! local caching happens here. Failures surface as [`StoreError`] and are
//! never silently swallowed; callers decide the fallback policy.

mod memory;
mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use async_trait::async_trait;
use std::time::Duration;
use stratus_core::StoreError;

/// Raw operations against the remote key-value store.
///
/// Implementations own the connection lifecycle and must support concurrent
/// calls without external locking.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Reads the raw bytes stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Writes `value` under `key` with the given time-to-live.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError>;

    /// Writes `value` under `key` only if the key is absent.
    ///
    /// Returns `true` when the write happened. This is the distributed-lock
    /// primitive used by the refresh-ahead scheduler.
    async fn set_nx(&self, key: &str, value: &[u8], ttl: Duration) -> Result<bool, StoreError>;

    /// Deletes `key`, returning `true` if it existed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Deletes every key matching `pattern`, returning how many were removed.
    async fn delete_pattern(&self, pattern: &str) -> Result<u64, StoreError>;

    /// Atomically increments the integer at `key` by `by`, returning the new value.
    async fn incr(&self, key: &str, by: i64) -> Result<i64, StoreError>;

    /// Increments `member`'s score in the sorted set at `key`, returning the new score.
    async fn zincr(&self, key: &str, member: &str, by: f64) -> Result<f64, StoreError>;

    /// Returns up to `count` members of the sorted set at `key`, highest score first.
    async fn ztop(&self, key: &str, count: usize) -> Result<Vec<String>, StoreError>;

    /// Sets the expiry of `key`, returning `true` if the key exists.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;
}
