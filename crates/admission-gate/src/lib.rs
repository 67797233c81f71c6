//! # Admission Gate - Token-Bucket Rate Limiting
//!
//! Per-identity token bucket guarding the gateway's entry points before
//! requests reach the order coordinator.
//!
//! ## Algorithm
//!
//! State lives in a shared store keyed by identity. Each call refills
//! `elapsed x refill_rate` tokens (capped at capacity), then deducts one;
//! the request is admitted iff a token was available after the refill.
//! The check-refill-deduct sequence executes as a single atomic operation
//! against the store, otherwise two concurrent requests could both read
//! "1 token available" and both be admitted.
//!
//! ## Fail-open policy
//!
//! If the shared store is unavailable the gate admits the request rather
//! than blocking traffic. Store availability is not a hard dependency for
//! system liveness; unlimited admission during an outage is an accepted
//! risk, and the choice is an explicit policy flag on the gate.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod gate;
pub mod store;

pub use gate::{Admission, AdmissionGate, GateProfile};
pub use store::{BucketStore, BucketStoreError, InMemoryBucketStore};

/// Bucket key for a user identity.
#[must_use]
pub fn user_bucket_key(user_id: u64) -> String {
    format!("rate_limiter:user:{user_id}")
}
