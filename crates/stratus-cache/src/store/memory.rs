//! In-memory store client.
//!
//! Used in tests and in cache-disabled deployments. TTLs passed to `set`
//! are recorded but not enforced here; the engine checks entry freshness
//! itself, which is also what keeps expiry testable under a manual clock.

use super::StoreClient;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use stratus_core::StoreError;

/// A process-local key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    sorted_sets: Mutex<HashMap<String, HashMap<String, f64>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of plain entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the store holds no plain entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Glob match supporting `*` wildcards, enough for the key patterns
/// this crate generates.
fn glob_match(pattern: &str, key: &str) -> bool {
    let segments: Vec<&str> = pattern.split('*').collect();
    if segments.len() == 1 {
        return pattern == key;
    }

    let mut rest = key;
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(segment) {
                Some(after) => rest = after,
                None => return false,
            }
        } else if i == segments.len() - 1 {
            return rest.ends_with(segment);
        } else {
            match rest.find(segment) {
                Some(pos) => rest = &rest[pos + segment.len()..],
                None => return false,
            }
        }
    }
    true
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8], _ttl: Duration) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &[u8], _ttl: Duration) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock();
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_vec());
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.lock().remove(key).is_some())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64, StoreError> {
        let mut entries = self.entries.lock();
        let matching: Vec<String> = entries
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect();
        for key in &matching {
            entries.remove(key);
        }
        Ok(matching.len() as u64)
    }

    async fn incr(&self, key: &str, by: i64) -> Result<i64, StoreError> {
        let mut entries = self.entries.lock();
        let current = match entries.get(key) {
            Some(bytes) => std::str::from_utf8(bytes)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| StoreError::Protocol(format!("key '{}' is not an integer", key)))?,
            None => 0,
        };
        let next = current + by;
        entries.insert(key.to_string(), next.to_string().into_bytes());
        Ok(next)
    }

    async fn zincr(&self, key: &str, member: &str, by: f64) -> Result<f64, StoreError> {
        let mut sets = self.sorted_sets.lock();
        let set = sets.entry(key.to_string()).or_default();
        let score = set.entry(member.to_string()).or_insert(0.0);
        *score += by;
        Ok(*score)
    }

    async fn ztop(&self, key: &str, count: usize) -> Result<Vec<String>, StoreError> {
        let sets = self.sorted_sets.lock();
        let Some(set) = sets.get(key) else {
            return Ok(Vec::new());
        };
        let mut members: Vec<(&String, &f64)> = set.iter().collect();
        members.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(members
            .into_iter()
            .take(count)
            .map(|(member, _)| member.clone())
            .collect())
    }

    async fn expire(&self, key: &str, _ttl: Duration) -> Result<bool, StoreError> {
        let has_entry =
            self.entries.lock().contains_key(key) || self.sorted_sets.lock().contains_key(key);
        Ok(has_entry)
    }
}
