//! Cross-service saga flows over the fully wired container.

pub mod admission;
pub mod cache_consistency;
pub mod failure_paths;
pub mod idempotency;
pub mod saga_flow;
