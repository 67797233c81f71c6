//! Gateway contract: checkout sessions, webhook payload, signature
//! verification, and the status-vocabulary mapping.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use shared_types::entities::{PaymentId, PaymentStatus};
use shared_types::ServiceError;

/// Reserved prefix on gateway-issued connectivity-test notifications.
/// These must be acknowledged without touching any stored state.
pub const TEST_NOTIFICATION_PREFIX: &str = "payment_notif_test_";

/// Prefix of gateway order identifiers minted by the reconciler.
pub const GATEWAY_ORDER_ID_PREFIX: &str = "PAY";

/// Build the externally-unique gateway order identifier for a payment.
///
/// The timestamp component keeps repeated initiation attempts for the
/// same payment from colliding at the gateway.
#[must_use]
pub fn derive_gateway_order_id(payment_id: PaymentId, now_unix: i64) -> String {
    format!("{GATEWAY_ORDER_ID_PREFIX}-{payment_id}-{now_unix}")
}

/// Extract the internal payment identity from a gateway order id.
///
/// Returns `None` when the string does not match `PAY-<id>-<ts>`; the
/// caller then falls back to a lookup by the literal string (payments
/// initiated before the identifier format was introduced).
#[must_use]
pub fn parse_gateway_order_id(gateway_order_id: &str) -> Option<PaymentId> {
    let mut parts = gateway_order_id.splitn(3, '-');
    if parts.next() != Some(GATEWAY_ORDER_ID_PREFIX) {
        return None;
    }
    let id = parts.next()?.parse::<PaymentId>().ok()?;
    // Timestamp component must be present, its value is irrelevant here
    parts.next()?;
    Some(id)
}

/// Verify the keyed hash that authenticates an inbound webhook.
///
/// Expected value: `hex(SHA-512(order_id || status_code || gross_amount
/// || server_key))`. This is the sole authentication for the callback,
/// the transport itself is unauthenticated.
pub fn verify_signature(
    server_key: &str,
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    signature_key: &str,
) -> Result<(), ServiceError> {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    let expected = hex::encode(hasher.finalize());

    if expected == signature_key {
        Ok(())
    } else {
        Err(ServiceError::InvalidSignature)
    }
}

/// Map the gateway's transaction/fraud vocabulary onto the internal
/// payment status. Unrecognized states map to `Pending`: an unknown
/// state must never be silently treated as success.
#[must_use]
pub fn map_transaction_status(
    transaction_status: &str,
    fraud_status: Option<&str>,
) -> PaymentStatus {
    match transaction_status {
        "capture" => {
            if fraud_status == Some("accept") {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Pending
            }
        }
        "settlement" => PaymentStatus::Paid,
        "pending" => PaymentStatus::Pending,
        "deny" | "cancel" | "expire" => PaymentStatus::Failed,
        "refund" | "partial_refund" => PaymentStatus::Refunded,
        _ => PaymentStatus::Pending,
    }
}

/// Inbound webhook payload.
///
/// A fixed record with named optional fields, validated field-by-field.
/// The gateway's `order_id` is OUR gateway order identifier, not an
/// internal order id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookNotification {
    pub order_id: String,
    pub transaction_id: Option<String>,
    pub transaction_status: String,
    pub payment_type: Option<String>,
    pub gross_amount: String,
    pub signature_key: String,
    pub fraud_status: Option<String>,
    pub status_code: String,
}

/// Customer details forwarded to the hosted checkout page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Hosted-checkout artifacts returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub token: String,
    pub redirect_url: String,
    pub va_number: Option<String>,
    pub qr_code_url: Option<String>,
}

/// Outbound port to the external payment gateway.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Create a hosted-checkout session for the given amount.
    ///
    /// The session expiry window is fixed by the reconciler; the
    /// gateway call itself is timeout-bounded by the caller.
    async fn create_checkout(
        &self,
        gateway_order_id: &str,
        amount: Decimal,
        customer: &Customer,
    ) -> Result<CheckoutSession, ServiceError>;
}
