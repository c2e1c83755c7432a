//! Cached user service implementation.

use crate::dto::{CreateUserRequest, UpdateUserRequest};
use crate::repository::UserRepository;
use crate::tracker::AccessTracker;
use crate::user_service::UserService;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use stratus_cache::{keys, CacheEngine};
use stratus_core::{StratusError, StratusResult, User, UserId, ValidateExt};
use tracing::{debug, info};

/// User service backed by the cache-aside engine.
///
/// Stateless and safe to share across tasks: all shared mutable state lives
/// in the engine and the store.
pub struct CachedUserService<R: UserRepository> {
    repository: Arc<R>,
    engine: Arc<CacheEngine>,
    tracker: Arc<dyn AccessTracker>,
    user_ttl: Duration,
}

impl<R: UserRepository + 'static> CachedUserService<R> {
    /// Creates a service using the engine's default TTL for user entries.
    #[must_use]
    pub fn new(engine: Arc<CacheEngine>, repository: Arc<R>, tracker: Arc<dyn AccessTracker>) -> Self {
        let user_ttl = engine.default_ttl();
        Self {
            repository,
            engine,
            tracker,
            user_ttl,
        }
    }

    async fn fetch_user(&self, id: UserId) -> StratusResult<User> {
        fetch_user(Arc::clone(&self.repository), Arc::clone(&self.tracker), id).await
    }
}

/// Fetches a user from the source, recording the access for hot-key
/// tracking. This is the loader the engine runs on a cache miss.
async fn fetch_user<R: UserRepository>(
    repository: Arc<R>,
    tracker: Arc<dyn AccessTracker>,
    id: UserId,
) -> StratusResult<User> {
    let user = repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| StratusError::not_found("User", id))?;
    tracker.record_access(id).await;
    Ok(user)
}

#[async_trait]
impl<R: UserRepository + 'static> UserService for CachedUserService<R> {
    async fn get_user(&self, id: UserId) -> StratusResult<User> {
        debug!("Getting user: {}", id);
        let key = keys::user_by_id(id);
        let repository = Arc::clone(&self.repository);
        let tracker = Arc::clone(&self.tracker);
        self.engine
            .resolve(&key, self.user_ttl, move || fetch_user(repository, tracker, id))
            .await
    }

    async fn get_user_bypass_cache(&self, id: UserId) -> StratusResult<User> {
        debug!("Getting user bypassing cache: {}", id);
        self.fetch_user(id).await
    }

    async fn add_user(&self, request: CreateUserRequest) -> StratusResult<User> {
        let request = request.into_validated()?.into_inner();
        info!("Adding user: {}", request.id);

        let user = User::new(request.id, request.name, request.email, Utc::now());
        let saved = self.repository.save(user).await?;
        self.engine
            .put(&keys::user_by_id(saved.id), &saved, self.user_ttl)
            .await?;
        Ok(saved)
    }

    async fn update_user(&self, id: UserId, request: UpdateUserRequest) -> StratusResult<User> {
        let request = request.into_validated()?.into_inner();
        info!("Updating user: {}", id);

        let existing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| StratusError::not_found("User", id))?;

        let updated = User {
            id,
            name: request.name,
            email: request.email,
            created_at: existing.created_at,
        };
        let saved = self.repository.save(updated).await?;
        self.engine
            .put(&keys::user_by_id(id), &saved, self.user_ttl)
            .await?;
        Ok(saved)
    }

    async fn remove_user(&self, id: UserId) -> StratusResult<()> {
        info!("Removing user: {}", id);
        if !self.repository.delete(id).await? {
            return Err(StratusError::not_found("User", id));
        }
        self.engine.invalidate(&keys::user_by_id(id)).await?;
        Ok(())
    }

    async fn remove_all_users(&self) -> StratusResult<()> {
        info!("Removing all users");
        self.repository.clear().await?;
        self.engine.invalidate_pattern(&keys::users_pattern()).await?;
        Ok(())
    }

    async fn get_all_users(&self) -> StratusResult<Vec<User>> {
        debug!("Fetching all users from source");
        self.repository.find_all().await
    }

    async fn refresh_user(&self, id: UserId) -> StratusResult<()> {
        debug!("Refreshing user in cache: {}", id);
        // Synthetic traffic: refreshes do not count as accesses, or the
        // scheduler would keep its own picks hot forever.
        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| StratusError::not_found("User", id))?;
        self.engine
            .put(&keys::user_by_id(id), &user, self.user_ttl)
            .await
    }
}
