//! # Shared Types - Entities and Errors for the Commerce Services
//!
//! Cross-service data model for the order -> payment saga:
//!
//! - Entities owned by exactly one service but referenced by others
//!   (`Order` by order-service, `Payment` by payment-service, `Product`
//!   by product-service).
//! - Closed status enumerations validated at every service boundary, so
//!   the two state machines cannot silently diverge between stores.
//! - The `ServiceError` taxonomy shared by all services, with a mapping
//!   to transport-level rejection classes.

pub mod entities;
pub mod errors;

pub use entities::{
    NewOrderItem, Order, OrderItem, OrderStatus, Payment, PaymentStatus, Product,
};
pub use errors::{RejectionClass, ServiceError};

/// Default currency for payments when the gateway does not specify one.
pub const DEFAULT_CURRENCY: &str = "IDR";
