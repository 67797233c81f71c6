//! # Order Service - Saga Coordinator
//!
//! Owns the order lifecycle: price computation, stock validation,
//! transactional persistence, event emission, and cache invalidation.
//!
//! ## Order creation sequence
//!
//! ```text
//! client ──→ create_order
//!              │ 1. fetch price/stock per item (RPC, uncached)
//!              │ 2. compute total server-side
//!              │ 3. insert order + items atomically (local transaction)
//!              │ 4. decrement stock per item (RPC, outside the transaction)
//!              │ 5. publish OrderCreated (best-effort)
//!              │ 6. invalidate the user's cached list pages
//!              ▼
//!            Order { status: pending }
//! ```
//!
//! Steps 4 and 5 are not covered by the local transaction's rollback: a
//! failed decrement leaves the order without a stock deduction and a
//! failed publish leaves it without a payment row. Both gaps are logged
//! and accepted rather than compensated.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod ports;
pub mod service;

pub use adapters::InMemoryOrderStore;
pub use ports::{OrderStore, ProductClient};
pub use service::OrderCoordinator;

use std::time::Duration;

/// Fixed page size for order-list queries.
pub const PAGE_SIZE: u64 = 15;

/// Bound on each synchronous call to another service. A stalled
/// downstream surfaces as `UpstreamUnavailable`, never as a hang.
pub const RPC_TIMEOUT: Duration = Duration::from_secs(3);
