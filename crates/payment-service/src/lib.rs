//! # Payment Service - Saga Reconciler
//!
//! Consumes order-created events, provisions pending payments, drives
//! gateway-hosted checkout, and reconciles asynchronous webhook
//! notifications back onto the order.
//!
//! ## Payment state machine
//!
//! ```text
//!              ┌──→ Paid     (capture+accept, settlement)
//! Pending ─────┼──→ Failed   (deny, cancel, expire)
//!              └──→ Refunded (refund, partial_refund)
//! ```
//!
//! The three non-pending states are terminal: once reached, later
//! webhook deliveries are acknowledged as no-ops. Combined with the
//! one-payment-per-order uniqueness constraint, this makes the whole
//! reconciliation path safe under at-least-once delivery.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod gateway;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryPaymentStore, StubCheckoutGateway};
pub use gateway::{
    derive_gateway_order_id, map_transaction_status, parse_gateway_order_id, verify_signature,
    CheckoutGateway, CheckoutSession, Customer, WebhookNotification, TEST_NOTIFICATION_PREFIX,
};
pub use ports::{OrderStatusClient, PaymentCreateError, PaymentStore};
pub use service::{CheckoutArtifacts, PaymentReconciler};

use std::time::Duration;

/// Validity window of a hosted-checkout session.
pub const CHECKOUT_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);

/// Bound on each synchronous call to the gateway or another service.
pub const RPC_TIMEOUT: Duration = Duration::from_secs(3);
