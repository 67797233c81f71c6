//! Ports for the payment reconciler.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared_types::entities::{OrderId, OrderStatus, Payment, PaymentId, PaymentStatus};
use shared_types::ServiceError;
use thiserror::Error;

/// Failure modes of payment-row creation.
///
/// `DuplicateOrder` carries the one-payment-per-order uniqueness
/// conflict out of the store so the consumer can treat a redelivered
/// event as a no-op instead of an error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PaymentCreateError {
    #[error("payment already exists for order {0}")]
    DuplicateOrder(OrderId),
    #[error(transparent)]
    Store(#[from] ServiceError),
}

/// Relational store owned by the payment service.
///
/// `order_id` is unique across rows; `create` is the only insert path.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Insert a pending payment for the order. A second insert for the
    /// same order fails with `DuplicateOrder`.
    async fn create(
        &self,
        order_id: OrderId,
        amount: Decimal,
        currency: &str,
    ) -> Result<Payment, PaymentCreateError>;

    async fn get_by_id(&self, id: PaymentId) -> Result<Option<Payment>, ServiceError>;

    async fn get_by_order_id(&self, order_id: OrderId) -> Result<Option<Payment>, ServiceError>;

    /// Lookup by the literal gateway order identifier string.
    async fn get_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Payment>, ServiceError>;

    /// Persist the gateway artifacts written by checkout initiation:
    /// method, channel, gateway order id, token, redirect URL,
    /// VA number, QR code URL, and expiry. Status is untouched.
    async fn update_gateway_fields(&self, payment: &Payment) -> Result<(), ServiceError>;

    /// Apply a reconciliation outcome: status, gateway transaction id,
    /// and the paid timestamp (set only for a paid outcome).
    async fn update_status(
        &self,
        id: PaymentId,
        status: PaymentStatus,
        transaction_id: Option<&str>,
        paid_at: Option<DateTime<Utc>>,
    ) -> Result<Payment, ServiceError>;
}

/// RPC link back into the order coordinator.
///
/// The reconciler propagates terminal payment outcomes through this
/// seam; calls are timeout-bounded at the call site.
#[async_trait]
pub trait OrderStatusClient: Send + Sync {
    async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), ServiceError>;
}
