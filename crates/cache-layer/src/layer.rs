//! The read-through cache layer.

use crate::store::{CacheStore, CacheStoreError};
use crate::SCAN_PAGE_SIZE;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Cache behavior knobs.
///
/// `fail_open` is a deliberate availability-over-strictness choice (the
/// cache is advisory); it is a named policy rather than an incidental
/// fallback. `op_timeout` bounds every store call so cache trouble can
/// never stall a write path beyond a best-effort attempt.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    pub fail_open: bool,
    pub op_timeout: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            fail_open: true,
            op_timeout: Duration::from_millis(500),
        }
    }
}

/// Read-through cache facade used by every service.
///
/// All operations are advisory: failures are logged and degraded to a
/// miss (`get`) or a no-op (writes and invalidation). Values are stored
/// as JSON.
#[derive(Clone)]
pub struct CacheLayer {
    store: Arc<dyn CacheStore>,
    policy: CachePolicy,
}

impl CacheLayer {
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            policy: CachePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(store: Arc<dyn CacheStore>, policy: CachePolicy) -> Self {
        Self { store, policy }
    }

    /// Run a store operation with the policy timeout, flattening
    /// timeout and store failure into one error shape.
    async fn bounded<T, F>(&self, fut: F) -> Result<T, CacheStoreError>
    where
        F: Future<Output = Result<T, CacheStoreError>> + Send,
    {
        match tokio::time::timeout(self.policy.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CacheStoreError::Unavailable("operation timed out".into())),
        }
    }

    /// Fetch and deserialize a cached value. Any failure is a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.bounded(self.store.get(key)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        let raw = raw?;
        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                // A corrupt entry must not poison reads; drop it.
                warn!(key, error = %e, "Cached value failed to deserialize, evicting");
                let _ = self.bounded(self.store.delete(key)).await;
                None
            }
        }
    }

    /// Serialize and store a value with a TTL. Failures are logged only.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize value for cache");
                return;
            }
        };

        match self.bounded(self.store.set(key, raw, ttl)).await {
            Ok(()) => debug!(key, ttl_secs = ttl.as_secs(), "Cache set"),
            Err(e) => warn!(key, error = %e, "Cache write failed"),
        }
    }

    /// Invalidate a single key. Failures are logged only.
    pub async fn delete(&self, key: &str) {
        match self.bounded(self.store.delete(key)).await {
            Ok(()) => debug!(key, "Cache key invalidated"),
            Err(e) => warn!(key, error = %e, "Cache invalidation failed"),
        }
    }

    /// Invalidate every key starting with `prefix`.
    ///
    /// Cursor-driven incremental scan, bounded page per call; all
    /// matches are collected before a single bulk delete is issued.
    pub async fn delete_by_pattern(&self, prefix: &str) {
        let mut cursor = 0;
        let mut matches: Vec<String> = Vec::new();

        loop {
            let (next_cursor, keys) = match self
                .bounded(self.store.scan(cursor, prefix, SCAN_PAGE_SIZE))
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!(prefix, error = %e, "Cache scan failed, pattern invalidation skipped");
                    return;
                }
            };
            matches.extend(keys);
            if next_cursor == 0 {
                break;
            }
            cursor = next_cursor;
        }

        if matches.is_empty() {
            return;
        }

        match self.bounded(self.store.delete_many(&matches)).await {
            Ok(()) => debug!(prefix, count = matches.len(), "Cache pattern invalidated"),
            Err(e) => warn!(prefix, error = %e, "Cache bulk delete failed"),
        }
    }

    /// Whether failures are absorbed (always true in production wiring).
    #[must_use]
    pub fn fails_open(&self) -> bool {
        self.policy.fail_open
    }
}
