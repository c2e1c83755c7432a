//! User service trait definition.

use crate::dto::{CreateUserRequest, UpdateUserRequest};
use async_trait::async_trait;
use stratus_core::{StratusResult, User, UserId};

/// CRUD operations on users, fronted by the cache.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Retrieves a user, consulting the cache first.
    async fn get_user(&self, id: UserId) -> StratusResult<User>;

    /// Retrieves a user straight from the source, bypassing the cache.
    async fn get_user_bypass_cache(&self, id: UserId) -> StratusResult<User>;

    /// Adds a new user to the source and writes it through to the cache.
    async fn add_user(&self, request: CreateUserRequest) -> StratusResult<User>;

    /// Updates an existing user in the source and refreshes its cache entry.
    async fn update_user(&self, id: UserId, request: UpdateUserRequest) -> StratusResult<User>;

    /// Removes a user from the source and evicts its cache entry.
    async fn remove_user(&self, id: UserId) -> StratusResult<()>;

    /// Removes every user from the source and every user entry from the cache.
    async fn remove_all_users(&self) -> StratusResult<()>;

    /// Returns every user currently in the source. Not cached.
    async fn get_all_users(&self) -> StratusResult<Vec<User>>;

    /// Fetches fresh data for a user and replaces its cache entry.
    ///
    /// Used by the refresh-ahead scheduler to keep hot users warm.
    async fn refresh_user(&self, id: UserId) -> StratusResult<()>;
}
