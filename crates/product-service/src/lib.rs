//! # Product Service
//!
//! Owns the product catalog: price and stock. The order coordinator
//! reaches this service over the RPC seam to read prices/stock at
//! order-creation time and to issue stock decrements.
//!
//! Single-product lookups are read-through cached (`product:<id>`);
//! mutations invalidate the product key and every product-list page.
//! Stock checks deliberately bypass the cache: correctness there
//! requires current data.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod ports;
pub mod service;

pub use adapters::InMemoryProductStore;
pub use ports::ProductStore;
pub use service::ProductService;
