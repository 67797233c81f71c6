//! # Commerce Saga Test Suite
//!
//! Unified test crate containing cross-service integration flows.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Shared fixtures (wired container, signing)
//! └── integration/      # Cross-service saga flows
//!     ├── saga_flow.rs          # Full happy path
//!     ├── idempotency.rs        # At-least-once delivery safety
//!     ├── failure_paths.rs      # Aborts, rejections, terminal states
//!     ├── admission.rs          # Rate limiting at the gate
//!     └── cache_consistency.rs  # No stale reads after mutation
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p commerce-tests
//! cargo test -p commerce-tests integration::saga_flow
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
pub mod support;
