//! Core entities shared across the commerce services.
//!
//! Ownership rules: `Order`/`OrderItem` are mutated only by the order
//! coordinator, `Payment` only by the payment reconciler, `Product` only
//! by the product service. Everyone else holds read-only copies.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User identity (issued by the identity layer, opaque here).
pub type UserId = u64;
/// Order identity, assigned by the order store.
pub type OrderId = u64;
/// Product identity, assigned by the product store.
pub type ProductId = u64;
/// Payment identity, assigned by the payment store.
pub type PaymentId = u64;

/// Order lifecycle status.
///
/// `Pending` is the only non-terminal state; transitions happen solely
/// through the reconciliation callback, never from clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
}

impl OrderStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Payment lifecycle status.
///
/// State machine: `Pending -> Paid | Failed | Refunded`. The three
/// non-pending states are terminal; later webhook deliveries for a
/// terminal payment are acknowledged as no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Whether this status absorbs all further transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            // "success" is the legacy spelling some gateway rows carry.
            "pending" => Ok(Self::Pending),
            "paid" | "success" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// An order, owned and mutated exclusively by the order coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    /// Sum of `quantity x price` over the order's items, computed
    /// server-side at creation time. Never trusted from the caller.
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item. Immutable once created; inserted in the same atomic
/// store operation as its order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A requested line item as sent by clients. Price is deliberately
/// absent: totals are recomputed from server-held prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A product, owned by the product service. The order coordinator reads
/// price/stock at order-creation time and issues a stock decrement; it
/// does not own product invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A payment record, 1:1 with an order (unique on `order_id`).
///
/// Created once per order when the order-created event is consumed;
/// mutated by checkout initiation (gateway fields) and by webhook
/// reconciliation (status + transaction id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub payment_method: Option<String>,
    pub payment_channel: Option<String>,
    /// Externally-unique identifier used with the gateway
    /// (`PAY-<paymentId>-<unixTimestamp>`).
    pub gateway_order_id: Option<String>,
    pub gateway_token: Option<String>,
    pub gateway_redirect_url: Option<String>,
    pub gateway_transaction_id: Option<String>,
    pub va_number: Option<String>,
    pub qr_code_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub expired_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// A fresh pending payment with no gateway artifacts yet.
    #[must_use]
    pub fn pending(id: PaymentId, order_id: OrderId, amount: Decimal, currency: &str) -> Self {
        Self {
            id,
            order_id,
            amount,
            currency: currency.to_string(),
            status: PaymentStatus::Pending,
            payment_method: None,
            payment_channel: None,
            gateway_order_id: None,
            gateway_token: None,
            gateway_redirect_url: None,
            gateway_transaction_id: None,
            va_number: None,
            qr_code_url: None,
            created_at: Utc::now(),
            paid_at: None,
            expired_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_status_round_trip() {
        for status in [OrderStatus::Pending, OrderStatus::Paid, OrderStatus::Failed] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_order_status_rejects_unknown() {
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_payment_status_terminality() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Paid.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(PaymentStatus::Refunded.is_terminal());
    }

    #[test]
    fn test_payment_status_accepts_legacy_success() {
        assert_eq!("success".parse::<PaymentStatus>().unwrap(), PaymentStatus::Paid);
    }

    #[test]
    fn test_pending_payment_defaults() {
        let payment = Payment::pending(1, 42, dec!(100.0), "IDR");
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.order_id, 42);
        assert!(payment.gateway_token.is_none());
        assert!(payment.paid_at.is_none());
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        let json = serde_json::to_string(&PaymentStatus::Refunded).unwrap();
        assert_eq!(json, "\"refunded\"");
    }
}
