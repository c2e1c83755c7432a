//! Redis-backed store client.

use super::StoreClient;
use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use std::future::Future;
use std::time::Duration;
use stratus_core::{StoreError, StratusError, StratusResult};
use tracing::debug;

/// Store client over a Redis connection pool.
///
/// Every call is bounded by `op_timeout`; a hung store call surfaces as
/// [`StoreError::Timeout`] instead of blocking callers indefinitely.
pub struct RedisStore {
    pool: Pool,
    op_timeout: Duration,
}

impl RedisStore {
    /// Creates a store client from an existing pool.
    #[must_use]
    pub fn new(pool: Pool, op_timeout: Duration) -> Self {
        Self { pool, op_timeout }
    }

    /// Creates a pool for `url` and verifies connectivity with a PING.
    pub async fn connect(url: &str, pool_size: usize, op_timeout: Duration) -> StratusResult<Self> {
        let cfg = Config::from_url(url);
        let pool = cfg
            .builder()
            .map_err(|e| StratusError::configuration(format!("Invalid Redis config: {}", e)))?
            .max_size(pool_size)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| StratusError::configuration(format!("Failed to create pool: {}", e)))?;

        let store = Self::new(pool, op_timeout);
        let mut conn = store.conn().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut *conn)
            .await
            .map_err(map_redis_err)?;

        debug!("Redis connection pool ready");
        Ok(store)
    }

    async fn conn(&self) -> Result<deadpool_redis::Connection, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to get Redis connection: {}", e)))
    }

    /// Bounds a store call by the configured timeout.
    async fn bounded<T, F>(&self, op: &str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.op_timeout, fut)
            .await
            .map_err(|_| StoreError::Timeout(format!("{} exceeded {:?}", op, self.op_timeout)))?
    }
}

fn map_redis_err(e: redis::RedisError) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout(e.to_string())
    } else if e.is_connection_refusal() || e.is_connection_dropped() || e.is_io_error() {
        StoreError::Unavailable(e.to_string())
    } else {
        StoreError::Protocol(e.to_string())
    }
}

fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl StoreClient for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.bounded("GET", async {
            let mut conn = self.conn().await?;
            let value: Option<Vec<u8>> = conn.get(key).await.map_err(map_redis_err)?;
            match &value {
                Some(_) => debug!("Store hit for key '{}'", key),
                None => debug!("Store miss for key '{}'", key),
            }
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError> {
        self.bounded("SET", async {
            let mut conn = self.conn().await?;
            conn.set_ex::<_, _, ()>(key, value, ttl_secs(ttl))
                .await
                .map_err(map_redis_err)?;
            debug!("Stored key '{}' with TTL {}s", key, ttl_secs(ttl));
            Ok(())
        })
        .await
    }

    async fn set_nx(&self, key: &str, value: &[u8], ttl: Duration) -> Result<bool, StoreError> {
        self.bounded("SET NX", async {
            let mut conn = self.conn().await?;
            let reply: Option<String> = redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("NX")
                .arg("EX")
                .arg(ttl_secs(ttl))
                .query_async(&mut *conn)
                .await
                .map_err(map_redis_err)?;
            Ok(reply.is_some())
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.bounded("DEL", async {
            let mut conn = self.conn().await?;
            let deleted: i64 = conn.del(key).await.map_err(map_redis_err)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64, StoreError> {
        self.bounded("DEL pattern", async {
            let mut conn = self.conn().await?;

            // KEYS is acceptable at the key cardinality this service holds;
            // swap for SCAN if the keyspace grows.
            let keys: Vec<String> = redis::cmd("KEYS")
                .arg(pattern)
                .query_async(&mut *conn)
                .await
                .map_err(map_redis_err)?;

            if keys.is_empty() {
                return Ok(0);
            }

            let deleted: i64 = conn.del(&keys).await.map_err(map_redis_err)?;
            debug!("Deleted {} keys matching pattern '{}'", deleted, pattern);
            Ok(deleted.max(0) as u64)
        })
        .await
    }

    async fn incr(&self, key: &str, by: i64) -> Result<i64, StoreError> {
        self.bounded("INCRBY", async {
            let mut conn = self.conn().await?;
            conn.incr(key, by).await.map_err(map_redis_err)
        })
        .await
    }

    async fn zincr(&self, key: &str, member: &str, by: f64) -> Result<f64, StoreError> {
        self.bounded("ZINCRBY", async {
            let mut conn = self.conn().await?;
            conn.zincr(key, member, by).await.map_err(map_redis_err)
        })
        .await
    }

    async fn ztop(&self, key: &str, count: usize) -> Result<Vec<String>, StoreError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        self.bounded("ZREVRANGE", async {
            let mut conn = self.conn().await?;
            conn.zrevrange(key, 0, count as isize - 1)
                .await
                .map_err(map_redis_err)
        })
        .await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        self.bounded("EXPIRE", async {
            let mut conn = self.conn().await?;
            conn.expire(key, ttl_secs(ttl) as i64)
                .await
                .map_err(map_redis_err)
        })
        .await
    }
}
