//! Composition root.
//!
//! Builds the full stack (store, engine, metrics, tracker, service,
//! scheduler) from an [`AppConfig`]. The HTTP boundary layer is expected to
//! hold a [`Stack`] and call into its service.

use crate::cached_user_service::CachedUserService;
use crate::refresher::{RefreshAheadScheduler, RefreshConfig};
use crate::repository::UserRepository;
use crate::tracker::{AccessTracker, StoreAccessTracker};
use crate::user_service::UserService;
use std::sync::Arc;
use stratus_cache::{
    CacheEngine, CacheMetrics, EngineConfig, MemoryStore, MetricsSink, RedisStore, StoreClient,
    SystemClock,
};
use stratus_config::AppConfig;
use stratus_core::StratusResult;
use tracing::info;

/// The assembled service stack.
pub struct Stack {
    /// The user-facing service facade.
    pub service: Arc<dyn UserService>,
    /// The cache engine (exposed for observability endpoints).
    pub engine: Arc<CacheEngine>,
    /// Hit/miss metrics over the same store the engine uses.
    pub metrics: Arc<CacheMetrics>,
    /// The refresh-ahead scheduler; call `spawn` to start it.
    pub scheduler: Arc<RefreshAheadScheduler>,
    /// The underlying store client.
    pub store: Arc<dyn StoreClient>,
}

/// Builds the stack described by `config` on top of the given repository.
///
/// With `redis.enabled = false` the stack runs against the in-memory store,
/// which keeps local development and tests free of external processes.
pub async fn build_stack<R: UserRepository + 'static>(
    config: &AppConfig,
    repository: Arc<R>,
) -> StratusResult<Stack> {
    let store: Arc<dyn StoreClient> = if config.redis.enabled {
        info!("Connecting to Redis at {}", config.redis.url);
        Arc::new(
            RedisStore::connect(
                &config.redis.url,
                config.redis.pool_size,
                config.cache.store_timeout(),
            )
            .await?,
        )
    } else {
        info!("Redis disabled, using in-memory store");
        Arc::new(MemoryStore::new())
    };

    let metrics = Arc::new(CacheMetrics::new(Arc::clone(&store)));
    let engine = Arc::new(
        CacheEngine::new(
            Arc::clone(&store),
            Arc::new(SystemClock),
            EngineConfig {
                cache_name: config.cache.cache_name.clone(),
                default_ttl: config.cache.default_ttl(),
                max_concurrent_loads: config.cache.max_concurrent_in_flight,
            },
        )
        .with_metrics(Arc::clone(&metrics) as Arc<dyn MetricsSink>),
    );

    let tracker: Arc<dyn AccessTracker> = Arc::new(StoreAccessTracker::new(Arc::clone(&store)));
    let service: Arc<dyn UserService> = Arc::new(CachedUserService::new(
        Arc::clone(&engine),
        repository,
        Arc::clone(&tracker),
    ));
    let scheduler = Arc::new(RefreshAheadScheduler::new(
        Arc::clone(&service),
        tracker,
        Arc::clone(&store),
        RefreshConfig::from(&config.refresh),
    ));

    Ok(Stack {
        service,
        engine,
        metrics,
        scheduler,
        store,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryUserRepository;

    #[tokio::test]
    async fn test_build_stack_with_memory_store() {
        let mut config = AppConfig::default();
        config.redis.enabled = false;

        let stack = build_stack(&config, Arc::new(InMemoryUserRepository::seeded()))
            .await
            .unwrap();

        let alice = stack.service.get_user(1).await.unwrap();
        assert_eq!(alice.name, "Alice");
        assert_eq!(stack.engine.in_flight_loads(), 0);
    }
}
