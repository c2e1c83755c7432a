//! Cache-aside engine with single-flight stampede protection.
//!
//! `resolve` returns a cached value or computes, stores, and returns a
//! fresh one. Concurrent identical requests collapse into exactly one
//! loader invocation regardless of fan-in; every waiter receives the same
//! settled outcome. Store-read failures degrade to recomputation, and
//! store-write failures after a successful load are logged but never fail
//! the caller.

use crate::clock::Clock;
use crate::codec;
use crate::entry::CacheEntry;
use crate::key::CacheKey;
use crate::metrics::MetricsSink;
use crate::store::StoreClient;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use stratus_core::{StratusError, StratusResult};
use tokio::sync::{watch, Semaphore};
use tracing::{debug, error, warn};

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Logical cache name used for metrics attribution.
    pub cache_name: String,
    /// TTL applied when callers do not specify one.
    pub default_ttl: Duration,
    /// Optional cap on the number of loads in flight at once.
    pub max_concurrent_loads: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_name: "default".to_string(),
            default_ttl: Duration::from_secs(300),
            max_concurrent_loads: None,
        }
    }
}

/// Outcome of a settled load, fanned out to every subscriber.
type LoadOutcome = Result<serde_json::Value, StratusError>;

type Registry = Arc<Mutex<HashMap<String, watch::Receiver<Option<LoadOutcome>>>>>;

/// The cache-aside engine.
///
/// All shared mutable state lives here: the in-flight load registry is
/// owned by the engine instance, not by any ambient global, so its lifetime
/// is the engine's own.
pub struct CacheEngine {
    store: Arc<dyn StoreClient>,
    clock: Arc<dyn Clock>,
    metrics: Option<Arc<dyn MetricsSink>>,
    in_flight: Registry,
    load_permits: Option<Arc<Semaphore>>,
    config: EngineConfig,
}

impl CacheEngine {
    /// Creates an engine over the given store and clock.
    #[must_use]
    pub fn new(store: Arc<dyn StoreClient>, clock: Arc<dyn Clock>, config: EngineConfig) -> Self {
        let load_permits = config
            .max_concurrent_loads
            .map(|cap| Arc::new(Semaphore::new(cap.max(1))));
        Self {
            store,
            clock,
            metrics: None,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            load_permits,
            config,
        }
    }

    /// Attaches a hit/miss metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// The TTL applied when callers do not specify one.
    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        self.config.default_ttl
    }

    /// Number of loads currently in flight. Exposed for observability.
    #[must_use]
    pub fn in_flight_loads(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Returns the cached value for `key`, or computes, stores, and returns
    /// a fresh one via `loader`.
    ///
    /// The loader runs in its own task: cancelling the caller that started
    /// it does not abort the load, so subscribers that joined the same
    /// in-flight load still receive its settlement.
    pub async fn resolve<T, F, Fut>(&self, key: &CacheKey, ttl: Duration, loader: F) -> StratusResult<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = StratusResult<T>> + Send + 'static,
    {
        if let Some(payload) = self.read_fresh_entry(key).await {
            self.record_hit().await;
            debug!("Cache hit for key '{}'", key);
            return from_payload(payload);
        }
        self.record_miss().await;
        debug!("Cache miss for key '{}'", key);

        let mut rx = match self.join_or_lead(key) {
            Role::Subscriber(rx) => {
                debug!("Joining in-flight load for key '{}'", key);
                rx
            }
            Role::Leader { tx, rx } => {
                self.spawn_load(key.clone(), ttl, tx, loader);
                rx
            }
        };

        let settled = rx.wait_for(|outcome| outcome.is_some()).await;
        let outcome = match settled {
            Ok(value) => (*value).clone(),
            // Sender dropped without settling: the load task panicked or was
            // torn down. The registry entry is already gone (drop guard), so
            // fail this caller rather than hang it.
            Err(_) => {
                return Err(StratusError::internal(format!(
                    "in-flight load for key '{}' was aborted",
                    key
                )))
            }
        };

        match outcome {
            Some(Ok(payload)) => from_payload(payload),
            Some(Err(e)) => Err(e),
            None => Err(StratusError::internal("in-flight load settled without an outcome")),
        }
    }

    /// Writes `value` under `key` wholesale (write-through refresh).
    ///
    /// Unlike the post-load write in `resolve`, store failures here are
    /// surfaced: a swallowed failure after a source mutation would leave a
    /// stale entry serving until its TTL runs out.
    pub async fn put<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: Duration) -> StratusResult<()> {
        let payload = serde_json::to_value(value)
            .map_err(|e| StratusError::serialization(e.to_string()))?;
        let entry = CacheEntry::new(payload, self.clock.now(), ttl);
        let bytes = codec::encode(&entry)?;
        self.store.set(key.as_str(), &bytes, ttl).await?;
        Ok(())
    }

    /// Removes the entry under `key`, returning whether it existed.
    pub async fn invalidate(&self, key: &CacheKey) -> StratusResult<bool> {
        debug!("Evicting key '{}'", key);
        Ok(self.store.delete(key.as_str()).await?)
    }

    /// Removes every entry matching `pattern`, returning how many were removed.
    pub async fn invalidate_pattern(&self, pattern: &str) -> StratusResult<u64> {
        debug!("Evicting keys matching '{}'", pattern);
        Ok(self.store.delete_pattern(pattern).await?)
    }

    /// Reads the entry for `key`, returning its payload only when present,
    /// decodable, and unexpired. Everything else is a miss: store-read
    /// failures degrade to recomputation (availability over consistency)
    /// and a corrupt entry will simply be overwritten by the next load.
    async fn read_fresh_entry(&self, key: &CacheKey) -> Option<serde_json::Value> {
        let bytes = match self.store.get(key.as_str()).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                if e.degrades_to_miss() {
                    warn!("Store read for key '{}' failed, treating as miss: {}", key, e);
                } else {
                    error!("Store read for key '{}' failed, treating as miss: {}", key, e);
                }
                return None;
            }
        };

        let entry: CacheEntry = match codec::decode(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Undecodable entry for key '{}', treating as miss: {}", key, e);
                return None;
            }
        };

        if entry.is_fresh(self.clock.now()) {
            Some(entry.payload)
        } else {
            debug!("Entry for key '{}' expired at {}", key, entry.expires_at());
            None
        }
    }

    /// Atomically joins an existing in-flight load or becomes its leader.
    ///
    /// The registry lock spans the whole check, so exactly one caller
    /// creates the in-flight load for a key; everyone else subscribes.
    fn join_or_lead(&self, key: &CacheKey) -> Role {
        let mut registry = self.in_flight.lock();
        if let Some(rx) = registry.get(key.as_str()) {
            Role::Subscriber(rx.clone())
        } else {
            let (tx, rx) = watch::channel(None);
            registry.insert(key.as_str().to_string(), rx.clone());
            Role::Leader { tx, rx }
        }
    }

    fn spawn_load<T, F, Fut>(
        &self,
        key: CacheKey,
        ttl: Duration,
        tx: watch::Sender<Option<LoadOutcome>>,
        loader: F,
    ) where
        T: Serialize + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = StratusResult<T>> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let clock = Arc::clone(&self.clock);
        let permits = self.load_permits.clone();
        let guard = InFlightGuard {
            registry: Arc::clone(&self.in_flight),
            key: key.as_str().to_string(),
            tx: Some(tx),
        };

        tokio::spawn(async move {
            let _permit = match permits {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };

            let outcome: LoadOutcome = match loader().await {
                Ok(value) => serde_json::to_value(&value)
                    .map_err(|e| StratusError::serialization(e.to_string())),
                Err(e) => Err(e),
            };

            if let Ok(payload) = &outcome {
                let entry = CacheEntry::new(payload.clone(), clock.now(), ttl);
                match codec::encode(&entry) {
                    Ok(bytes) => {
                        // Best effort: the freshly computed value is still
                        // valid to return even if the store rejects it.
                        if let Err(e) = store.set(key.as_str(), &bytes, ttl).await {
                            warn!("Store write after load for key '{}' failed: {}", key, e);
                        }
                    }
                    Err(e) => warn!("Could not encode entry for key '{}': {}", key, e),
                }
            }

            guard.settle(outcome);
        });
    }

    async fn record_hit(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.record_hit(&self.config.cache_name).await;
        }
    }

    async fn record_miss(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.record_miss(&self.config.cache_name).await;
        }
    }
}

enum Role {
    Leader {
        tx: watch::Sender<Option<LoadOutcome>>,
        rx: watch::Receiver<Option<LoadOutcome>>,
    },
    Subscriber(watch::Receiver<Option<LoadOutcome>>),
}

/// Removes the in-flight registry entry when the load task finishes.
///
/// `settle` removes the entry and notifies subscribers under the registry
/// lock, so a late arrival either joins before settlement or starts a fresh
/// load. If the task unwinds instead, `Drop` still removes the entry and the
/// dropped sender wakes waiters with a closed-channel error.
struct InFlightGuard {
    registry: Registry,
    key: String,
    tx: Option<watch::Sender<Option<LoadOutcome>>>,
}

impl InFlightGuard {
    fn settle(mut self, outcome: LoadOutcome) {
        if let Some(tx) = self.tx.take() {
            let mut registry = self.registry.lock();
            registry.remove(&self.key);
            let _ = tx.send(Some(outcome));
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        // The sender must outlive the removal: closing the channel first
        // would let a caller subscribe to a dead channel instead of starting
        // a fresh load.
        if let Some(tx) = self.tx.take() {
            self.registry.lock().remove(&self.key);
            drop(tx);
        }
    }
}

fn from_payload<T: DeserializeOwned>(payload: serde_json::Value) -> StratusResult<T> {
    serde_json::from_value(payload).map_err(|e| StratusError::serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::key::keys;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use stratus_core::StoreError;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Report {
        id: u64,
        body: String,
    }

    fn engine_with(store: Arc<dyn StoreClient>, clock: Arc<dyn Clock>) -> CacheEngine {
        CacheEngine::new(store, clock, EngineConfig::default())
    }

    fn manual_clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::starting_at(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ))
    }

    /// A store whose reads and writes always fail with the given error.
    struct FailingStore {
        error: StoreError,
        writes_attempted: AtomicUsize,
    }

    impl FailingStore {
        fn unavailable() -> Self {
            Self {
                error: StoreError::Unavailable("connection refused".into()),
                writes_attempted: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl StoreClient for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            Err(self.error.clone())
        }
        async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<(), StoreError> {
            self.writes_attempted.fetch_add(1, Ordering::SeqCst);
            Err(self.error.clone())
        }
        async fn set_nx(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<bool, StoreError> {
            Err(self.error.clone())
        }
        async fn delete(&self, _key: &str) -> Result<bool, StoreError> {
            Err(self.error.clone())
        }
        async fn delete_pattern(&self, _pattern: &str) -> Result<u64, StoreError> {
            Err(self.error.clone())
        }
        async fn incr(&self, _key: &str, _by: i64) -> Result<i64, StoreError> {
            Err(self.error.clone())
        }
        async fn zincr(&self, _key: &str, _member: &str, _by: f64) -> Result<f64, StoreError> {
            Err(self.error.clone())
        }
        async fn ztop(&self, _key: &str, _count: usize) -> Result<Vec<String>, StoreError> {
            Err(self.error.clone())
        }
        async fn expire(&self, _key: &str, _ttl: Duration) -> Result<bool, StoreError> {
            Err(self.error.clone())
        }
    }

    #[tokio::test]
    async fn test_miss_then_hit_without_second_load() {
        let engine = engine_with(Arc::new(MemoryStore::new()), manual_clock());
        let key = CacheKey::new("report", &["Q1"]);
        let loads = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let loads = Arc::clone(&loads);
            let value: Report = engine
                .resolve(&key, Duration::from_secs(60), move || async move {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(Report { id: 1, body: "q1".into() })
                })
                .await
                .unwrap();
            assert_eq!(value.body, "q1");
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_fifty_concurrent_resolves_invoke_loader_once() {
        let engine = Arc::new(engine_with(Arc::new(MemoryStore::new()), manual_clock()));
        let key = CacheKey::new("report", &["Q1"]);
        let loads = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..50 {
            let engine = Arc::clone(&engine);
            let key = key.clone();
            let loads = Arc::clone(&loads);
            handles.push(tokio::spawn(async move {
                engine
                    .resolve(&key, Duration::from_secs(60), move || async move {
                        loads.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(Report { id: 9, body: "fixed".into() })
                    })
                    .await
            }));
        }

        let results = futures::future::join_all(handles).await;
        for result in results {
            let report: Report = result.unwrap().unwrap();
            assert_eq!(report, Report { id: 9, body: "fixed".into() });
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(engine.in_flight_loads(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_loader_error_reaches_every_subscriber_and_is_not_cached() {
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(engine_with(store.clone() as Arc<dyn StoreClient>, manual_clock()));
        let key = CacheKey::new("report", &["broken"]);
        let loads = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let engine = Arc::clone(&engine);
            let key = key.clone();
            let loads = Arc::clone(&loads);
            handles.push(tokio::spawn(async move {
                engine
                    .resolve::<Report, _, _>(&key, Duration::from_secs(60), move || async move {
                        loads.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Err(StratusError::loader("upstream exploded"))
                    })
                    .await
            }));
        }

        for result in futures::future::join_all(handles).await {
            let err = result.unwrap().unwrap_err();
            assert!(matches!(err, StratusError::Loader(_)));
            assert!(err.to_string().contains("upstream exploded"));
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        // Failed loads leave nothing behind.
        assert!(store.is_empty());

        // A later call starts a fresh load.
        let value: Report = engine
            .resolve(&key, Duration::from_secs(60), move || async move {
                Ok(Report { id: 2, body: "recovered".into() })
            })
            .await
            .unwrap();
        assert_eq!(value.body, "recovered");
    }

    #[tokio::test]
    async fn test_unavailable_store_degrades_to_loader_and_still_writes() {
        let store = Arc::new(FailingStore::unavailable());
        let engine = engine_with(store.clone() as Arc<dyn StoreClient>, manual_clock());
        let key = keys::user_by_id(42);

        let value: Report = engine
            .resolve(&key, Duration::from_secs(60), move || async move {
                Ok(Report { id: 42, body: "fresh".into() })
            })
            .await
            .unwrap();

        assert_eq!(value.id, 42);
        assert_eq!(store.writes_attempted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_never_served() {
        let clock = manual_clock();
        let engine = engine_with(
            Arc::new(MemoryStore::new()),
            clock.clone() as Arc<dyn Clock>,
        );
        let key = keys::user_by_id(42);
        let loads = Arc::new(AtomicUsize::new(0));

        let load = |loads: Arc<AtomicUsize>| {
            move || async move {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok(Report { id: 42, body: "v".into() })
            }
        };

        let _: Report = engine
            .resolve(&key, Duration::from_secs(60), load(Arc::clone(&loads)))
            .await
            .unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        // Within the window: served from the store, loader untouched.
        clock.advance(Duration::from_secs(59));
        let _: Report = engine
            .resolve(&key, Duration::from_secs(60), load(Arc::clone(&loads)))
            .await
            .unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        // Past the window: the store still holds the bytes (MemoryStore
        // never purges) but the engine refuses to serve them.
        clock.advance(Duration::from_secs(2));
        let _: Report = engine
            .resolve(&key, Duration::from_secs(60), load(Arc::clone(&loads)))
            .await
            .unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_treated_as_miss() {
        let store = Arc::new(MemoryStore::new());
        let key = keys::user_by_id(7);
        store
            .set(key.as_str(), b"definitely not an entry", Duration::from_secs(60))
            .await
            .unwrap();

        let engine = engine_with(store as Arc<dyn StoreClient>, manual_clock());
        let value: Report = engine
            .resolve(&key, Duration::from_secs(60), move || async move {
                Ok(Report { id: 7, body: "rebuilt".into() })
            })
            .await
            .unwrap();
        assert_eq!(value.body, "rebuilt");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cancelled_leader_does_not_strand_subscribers() {
        let engine = Arc::new(engine_with(Arc::new(MemoryStore::new()), manual_clock()));
        let key = CacheKey::new("report", &["slow"]);
        let loads = Arc::new(AtomicUsize::new(0));

        let leader = {
            let engine = Arc::clone(&engine);
            let key = key.clone();
            let loads = Arc::clone(&loads);
            tokio::spawn(async move {
                engine
                    .resolve::<Report, _, _>(&key, Duration::from_secs(60), move || async move {
                        loads.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok(Report { id: 5, body: "survived".into() })
                    })
                    .await
            })
        };

        // Let the leader start its load, then join as a subscriber.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let subscriber = {
            let engine = Arc::clone(&engine);
            let key = key.clone();
            tokio::spawn(async move {
                engine
                    .resolve::<Report, _, _>(&key, Duration::from_secs(60), move || async move {
                        panic!("subscriber loader must not run")
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        leader.abort();

        let report = subscriber.await.unwrap().unwrap();
        assert_eq!(report.body, "survived");
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_panicking_loader_fails_waiters_and_clears_registry() {
        let engine = Arc::new(engine_with(Arc::new(MemoryStore::new()), manual_clock()));
        let key = CacheKey::new("report", &["poisoned"]);

        let leader = {
            let engine = Arc::clone(&engine);
            let key = key.clone();
            tokio::spawn(async move {
                engine
                    .resolve::<Report, _, _>(&key, Duration::from_secs(60), move || async move {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        panic!("loader blew up")
                    })
                    .await
            })
        };

        // Join as a subscriber while the doomed load is still running.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let subscriber = {
            let engine = Arc::clone(&engine);
            let key = key.clone();
            tokio::spawn(async move {
                engine
                    .resolve::<Report, _, _>(&key, Duration::from_secs(60), move || async move {
                        panic!("subscriber loader must not run")
                    })
                    .await
            })
        };

        // Both callers fail promptly instead of hanging on the dead load.
        let bounded = Duration::from_secs(2);
        let leader_err = tokio::time::timeout(bounded, leader)
            .await
            .expect("leader must not hang")
            .unwrap()
            .unwrap_err();
        assert!(matches!(leader_err, StratusError::Internal(_)));
        let subscriber_err = tokio::time::timeout(bounded, subscriber)
            .await
            .expect("subscriber must not hang")
            .unwrap()
            .unwrap_err();
        assert!(matches!(subscriber_err, StratusError::Internal(_)));

        // The registry entry is gone and the key is loadable again.
        assert_eq!(engine.in_flight_loads(), 0);
        let value: Report = engine
            .resolve(&key, Duration::from_secs(60), move || async move {
                Ok(Report { id: 8, body: "recovered".into() })
            })
            .await
            .unwrap();
        assert_eq!(value.body, "recovered");
    }

    #[tokio::test]
    async fn test_put_then_resolve_hits_without_loader() {
        let engine = engine_with(Arc::new(MemoryStore::new()), manual_clock());
        let key = keys::user_by_id(1);
        let fresh = Report { id: 1, body: "pushed".into() };

        engine.put(&key, &fresh, Duration::from_secs(60)).await.unwrap();

        let value: Report = engine
            .resolve(&key, Duration::from_secs(60), move || async move {
                panic!("loader must not run after put")
            })
            .await
            .unwrap();
        assert_eq!(value, fresh);
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let engine = engine_with(Arc::new(MemoryStore::new()), manual_clock());
        let key = keys::user_by_id(3);
        engine
            .put(&key, &Report { id: 3, body: "x".into() }, Duration::from_secs(60))
            .await
            .unwrap();

        assert!(engine.invalidate(&key).await.unwrap());
        assert!(!engine.invalidate(&key).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_distinct_keys_load_in_parallel() {
        let engine = Arc::new(engine_with(Arc::new(MemoryStore::new()), manual_clock()));
        let started = std::time::Instant::now();

        let mut handles = Vec::new();
        for id in 0..4u64 {
            let engine = Arc::clone(&engine);
            handles.push(tokio::spawn(async move {
                let key = keys::user_by_id(id);
                engine
                    .resolve::<Report, _, _>(&key, Duration::from_secs(60), move || async move {
                        tokio::time::sleep(Duration::from_millis(80)).await;
                        Ok(Report { id, body: "p".into() })
                    })
                    .await
            }));
        }

        for result in futures::future::join_all(handles).await {
            result.unwrap().unwrap();
        }
        // Four 80ms loads in parallel finish well under four serialized ones.
        assert!(started.elapsed() < Duration::from_millis(300));
    }
}
