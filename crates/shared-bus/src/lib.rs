//! # Shared Bus - Event Bus for Inter-Service Messaging
//!
//! Carries the asynchronous leg of the order -> payment saga:
//!
//! ```text
//! ┌──────────────────┐                     ┌─────────────────────┐
//! │ OrderCoordinator │                     │ PaymentReconciler   │
//! │                  │    publish()        │ (consumer group)    │
//! │                  │ ──────┐             │                     │
//! └──────────────────┘       │             └─────────────────────┘
//!                            ▼                       ↑
//!                      ┌───────────────┐             │
//!                      │  order-events │ ────────────┘
//!                      └───────────────┘   subscribe()
//! ```
//!
//! ## Delivery semantics
//!
//! At-least-once: a message may reach a consumer more than once (broker
//! redelivery, consumer restart) but is never silently dropped while a
//! subscriber is attached. Consumers must therefore be idempotent.
//! Ordering across distinct orders is not guaranteed.
//!
//! The in-memory implementation is the single-node stand-in for a
//! brokered deployment; distributed setups swap the adapter behind the
//! same `EventPublisher`/`Subscription` seam.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventTopic, OrderEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Topic carrying order lifecycle events.
pub const ORDER_EVENTS_TOPIC: &str = "order-events";

/// Maximum events buffered per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
