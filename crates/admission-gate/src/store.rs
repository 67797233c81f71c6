//! Bucket store port and the in-memory adapter.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use thiserror::Error;

/// Errors from the shared bucket store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BucketStoreError {
    /// The store could not be reached.
    #[error("bucket store unavailable: {0}")]
    Unavailable(String),
}

/// Shared store holding token-bucket state per identity.
///
/// `take` must execute the whole check-refill-deduct sequence atomically
/// for the given key. A networked implementation achieves this with an
/// atomically-evaluated server-side script; the in-memory adapter uses a
/// per-entry lock.
#[async_trait]
pub trait BucketStore: Send + Sync {
    /// Refill the bucket for `key` to `now_unix`, then attempt to deduct
    /// one token. Returns whether a token was available.
    async fn take(
        &self,
        key: &str,
        capacity: u32,
        refill_per_second: f64,
        now_unix: u64,
    ) -> Result<bool, BucketStoreError>;
}

struct Bucket {
    tokens: f64,
    last_refill_unix: u64,
}

/// In-memory bucket store.
///
/// Each bucket sits behind its own lock, making the refill-and-deduct
/// indivisible per key while keeping distinct identities uncontended.
pub struct InMemoryBucketStore {
    buckets: DashMap<String, Mutex<Bucket>>,
}

impl InMemoryBucketStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
        }
    }

    /// Number of tracked identities.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

impl Default for InMemoryBucketStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BucketStore for InMemoryBucketStore {
    async fn take(
        &self,
        key: &str,
        capacity: u32,
        refill_per_second: f64,
        now_unix: u64,
    ) -> Result<bool, BucketStoreError> {
        let entry = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| {
                Mutex::new(Bucket {
                    tokens: f64::from(capacity),
                    last_refill_unix: now_unix,
                })
            });

        let mut bucket = entry.lock();

        // Refill for elapsed time, capped at capacity. A clock that
        // moved backwards refills nothing.
        let elapsed = now_unix.saturating_sub(bucket.last_refill_unix);
        if elapsed > 0 {
            bucket.tokens =
                (bucket.tokens + elapsed as f64 * refill_per_second).min(f64::from(capacity));
            bucket.last_refill_unix = now_unix;
        }

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
