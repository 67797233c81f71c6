//! # Cache Layer - Read-Through Cache with Invalidation
//!
//! TTL-based key/value cache consulted before the source of truth and
//! populated on miss. Keys are namespaced per entity and per list page so
//! that mutations can invalidate exactly the views that could be stale.
//!
//! ## Fail-open policy
//!
//! The cache is advisory, never authoritative: every value is
//! reconstructable from the owning service's relational store. All cache
//! operations degrade to a miss or a no-op on failure (connection loss,
//! serialization error, timeout). No code path may fail a user-visible
//! operation because the cache is unavailable.
//!
//! ## Pattern invalidation
//!
//! `delete_by_pattern` walks the keyspace with a cursor-driven,
//! bounded-page scan (never a single blocking full-keyspace operation),
//! collects every match, then issues one bulk delete.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod keys;
pub mod layer;
pub mod store;

pub use layer::{CacheLayer, CachePolicy};
pub use store::{CacheStore, CacheStoreError, InMemoryCacheStore};

use std::time::Duration;

/// TTL for a single cached order.
pub const ORDER_TTL: Duration = Duration::from_secs(10 * 60);
/// TTL for a cached order-list page. Shorter than single entities:
/// list freshness matters more.
pub const ORDER_LIST_TTL: Duration = Duration::from_secs(5 * 60);
/// TTL for a single cached product.
pub const PRODUCT_TTL: Duration = Duration::from_secs(10 * 60);
/// TTL for a cached product-list page.
pub const PRODUCT_LIST_TTL: Duration = Duration::from_secs(5 * 60);
/// TTL for a cached payment.
pub const PAYMENT_TTL: Duration = Duration::from_secs(5 * 60);

/// Page size for each cursor-driven scan call.
pub const SCAN_PAGE_SIZE: usize = 100;
