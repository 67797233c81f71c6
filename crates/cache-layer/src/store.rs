//! Cache store port and the in-memory adapter.
//!
//! The port mirrors the subset of a networked cache (Redis-style) the
//! layer needs: point reads/writes with TTL, bulk delete, and a
//! cursor-driven keyspace scan with a bounded page per call.

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors from the underlying cache store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheStoreError {
    /// The store could not be reached or the operation failed in flight.
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
}

/// Storage port for the cache layer.
///
/// Implementations must make `scan` cursor-driven: each call inspects at
/// most `count` keys and returns the cursor for the next call, `0`
/// meaning the walk is complete. This keeps pattern invalidation
/// non-blocking on large keyspaces.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a value. `None` means the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheStoreError>;

    /// Store a value with a TTL.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheStoreError>;

    /// Remove a single key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheStoreError>;

    /// Remove a batch of keys in one operation.
    async fn delete_many(&self, keys: &[String]) -> Result<(), CacheStoreError>;

    /// Walk one bounded page of the keyspace, returning keys matching
    /// the prefix and the cursor for the next call (`0` = done).
    async fn scan(
        &self,
        cursor: u64,
        prefix: &str,
        count: usize,
    ) -> Result<(u64, Vec<String>), CacheStoreError>;
}

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-memory TTL cache store.
///
/// Single-node stand-in for the shared networked cache; the layer above
/// is oblivious to which one it talks to.
pub struct InMemoryCacheStore {
    entries: DashMap<String, Entry>,
}

impl InMemoryCacheStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of live (unexpired) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|e| e.value().expires_at > now)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted snapshot of live keys. Sorting gives the index-based
    /// cursor a stable order between scan calls.
    fn live_keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.value().expires_at > now)
            .map(|e| e.key().clone())
            .collect();
        keys.sort();
        keys
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheStoreError> {
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > Instant::now() {
                return Ok(Some(entry.value.clone()));
            }
        }
        // Expired entries are dropped lazily on read.
        self.entries
            .remove_if(key, |_, e| e.expires_at <= Instant::now());
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheStoreError> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheStoreError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<(), CacheStoreError> {
        for key in keys {
            self.entries.remove(key);
        }
        Ok(())
    }

    async fn scan(
        &self,
        cursor: u64,
        prefix: &str,
        count: usize,
    ) -> Result<(u64, Vec<String>), CacheStoreError> {
        let keys = self.live_keys();
        let start = cursor as usize;
        if start >= keys.len() {
            return Ok((0, Vec::new()));
        }

        let end = (start + count.max(1)).min(keys.len());
        let matches = keys[start..end]
            .iter()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();

        let next_cursor = if end >= keys.len() { 0 } else { end as u64 };
        Ok((next_cursor, matches))
    }
}
