//! # Commerce Runtime
//!
//! Single-process wiring for the commerce services.
//!
//! ## Saga flow
//!
//! ```text
//! client ──→ AdmissionGate ──→ OrderCoordinator ──→ order store (txn)
//!                                    │
//!                              OrderCreated ──→ event bus ──→ consumer
//!                                                                │
//!                                                      PaymentReconciler
//!                                                                │
//!                                              gateway checkout ─┤
//!                                                                │
//!                 OrderCoordinator ←── status RPC ←── webhook ───┘
//! ```
//!
//! ## Modular Structure
//!
//! - `config` - Runtime configuration with environment overrides
//! - `container` - Service container with dependency injection
//! - `clients` - In-process adapters for the RPC seams
//! - `consumer` - Order-events consumer loop

pub mod clients;
pub mod config;
pub mod consumer;
pub mod container;

pub use clients::{LocalOrderStatusClient, LocalProductClient};
pub use config::{ConfigError, RuntimeConfig, DEV_SERVER_KEY};
pub use consumer::run_consumer;
pub use container::ServiceContainer;
