//! Cache key construction.
//!
//! Keys are opaque to the store but built deterministically: two logically
//! equal requests always produce the same key.

use std::fmt;

/// Prefix for all cache keys to namespace them.
const CACHE_PREFIX: &str = "stratus:cache";

/// An immutable, deterministically built cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Builds a key from a logical namespace and an ordered parameter set.
    #[must_use]
    pub fn new(namespace: &str, parts: &[&str]) -> Self {
        let mut key = format!("{}:{}", CACHE_PREFIX, namespace);
        for part in parts {
            key.push(':');
            key.push_str(part);
        }
        Self(key)
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}

/// Cache key generators for consistent key naming.
pub mod keys {
    use super::CacheKey;

    /// Key for a user cached by ID.
    #[must_use]
    pub fn user_by_id(id: u64) -> CacheKey {
        CacheKey::new("user", &["id", &id.to_string()])
    }

    /// Pattern matching every cached user entry.
    #[must_use]
    pub fn users_pattern() -> String {
        format!("{}:user:*", super::CACHE_PREFIX)
    }
}
