//! User repository.
//!
//! The original system this service models fronts a slow primary store;
//! here that store is an in-memory map with an optional simulated fetch
//! latency, which is exactly what makes the cache worth having in demos
//! and what the tests lean on to prove the cache avoids fetches.

use async_trait::async_trait;
use chrono::TimeZone;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use stratus_core::{StratusResult, User, UserId};
use tracing::debug;

/// Source-of-truth access for users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetches a user by id.
    async fn find_by_id(&self, id: UserId) -> StratusResult<Option<User>>;

    /// Inserts or replaces a user, returning the stored value.
    async fn save(&self, user: User) -> StratusResult<User>;

    /// Removes a user, returning whether it existed.
    async fn delete(&self, id: UserId) -> StratusResult<bool>;

    /// Removes every user.
    async fn clear(&self) -> StratusResult<()>;

    /// Returns all users, ordered by id.
    async fn find_all(&self) -> StratusResult<Vec<User>>;
}

fn seed_time(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
        .unwrap_or_default()
}

/// In-memory user repository.
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
    fetch_latency: Option<Duration>,
    fetches: AtomicUsize,
}

impl InMemoryUserRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            fetch_latency: None,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Creates a repository seeded with the demo fixtures.
    #[must_use]
    pub fn seeded() -> Self {
        let repo = Self::empty();
        {
            let mut users = repo.users.write();
            users.insert(
                1,
                User::new(
                    1,
                    "Alice",
                    "alice@example.com",
                    seed_time(2025, 10, 6, 0, 0, 0),
                ),
            );
            users.insert(
                2,
                User::new(
                    2,
                    "Bob",
                    "bob@example.com",
                    seed_time(2025, 10, 6, 0, 5, 0),
                ),
            );
        }
        repo
    }

    /// Adds a simulated per-fetch latency.
    #[must_use]
    pub fn with_fetch_latency(mut self, latency: Duration) -> Self {
        self.fetch_latency = Some(latency);
        self
    }

    /// Number of `find_by_id` fetches served so far.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.fetch_latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> StratusResult<Option<User>> {
        debug!("Fetching user from source with id {}", id);
        self.simulate_latency().await;
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.read().get(&id).cloned())
    }

    async fn save(&self, user: User) -> StratusResult<User> {
        self.users.write().insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: UserId) -> StratusResult<bool> {
        Ok(self.users.write().remove(&id).is_some())
    }

    async fn clear(&self) -> StratusResult<()> {
        self.users.write().clear();
        Ok(())
    }

    async fn find_all(&self) -> StratusResult<Vec<User>> {
        let mut users: Vec<User> = self.users.read().values().cloned().collect();
        users.sort_by_key(|user| user.id);
        Ok(users)
    }
}
