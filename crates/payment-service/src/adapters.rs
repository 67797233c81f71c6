//! In-memory adapters for the payment reconciler's ports.

use crate::gateway::{CheckoutGateway, CheckoutSession, Customer};
use crate::ports::{PaymentCreateError, PaymentStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use shared_types::entities::{OrderId, Payment, PaymentId, PaymentStatus};
use shared_types::ServiceError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

struct Tables {
    payments: HashMap<PaymentId, Payment>,
    by_order: HashMap<OrderId, PaymentId>,
}

/// In-memory stand-in for the payment service's relational store.
///
/// The `by_order` index enforces the one-payment-per-order uniqueness
/// constraint the consumer relies on for idempotency.
pub struct InMemoryPaymentStore {
    tables: RwLock<Tables>,
    next_id: AtomicU64,
}

impl InMemoryPaymentStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                payments: HashMap::new(),
                by_order: HashMap::new(),
            }),
            next_id: AtomicU64::new(1),
        }
    }

    /// Total number of payment rows (all orders).
    #[must_use]
    pub fn payment_count(&self) -> usize {
        self.tables.read().payments.len()
    }
}

impl Default for InMemoryPaymentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn create(
        &self,
        order_id: OrderId,
        amount: Decimal,
        currency: &str,
    ) -> Result<Payment, PaymentCreateError> {
        let mut tables = self.tables.write();
        if tables.by_order.contains_key(&order_id) {
            return Err(PaymentCreateError::DuplicateOrder(order_id));
        }

        let payment = Payment::pending(
            self.next_id.fetch_add(1, Ordering::SeqCst),
            order_id,
            amount,
            currency,
        );
        tables.by_order.insert(order_id, payment.id);
        tables.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn get_by_id(&self, id: PaymentId) -> Result<Option<Payment>, ServiceError> {
        Ok(self.tables.read().payments.get(&id).cloned())
    }

    async fn get_by_order_id(&self, order_id: OrderId) -> Result<Option<Payment>, ServiceError> {
        let tables = self.tables.read();
        Ok(tables
            .by_order
            .get(&order_id)
            .and_then(|id| tables.payments.get(id))
            .cloned())
    }

    async fn get_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Payment>, ServiceError> {
        Ok(self
            .tables
            .read()
            .payments
            .values()
            .find(|payment| payment.gateway_order_id.as_deref() == Some(gateway_order_id))
            .cloned())
    }

    async fn update_gateway_fields(&self, payment: &Payment) -> Result<(), ServiceError> {
        let mut tables = self.tables.write();
        let row = tables
            .payments
            .get_mut(&payment.id)
            .ok_or_else(|| ServiceError::NotFound(format!("payment {}", payment.id)))?;

        row.payment_method = payment.payment_method.clone();
        row.payment_channel = payment.payment_channel.clone();
        row.gateway_order_id = payment.gateway_order_id.clone();
        row.gateway_token = payment.gateway_token.clone();
        row.gateway_redirect_url = payment.gateway_redirect_url.clone();
        row.va_number = payment.va_number.clone();
        row.qr_code_url = payment.qr_code_url.clone();
        row.expired_at = payment.expired_at;
        Ok(())
    }

    async fn update_status(
        &self,
        id: PaymentId,
        status: PaymentStatus,
        transaction_id: Option<&str>,
        paid_at: Option<DateTime<Utc>>,
    ) -> Result<Payment, ServiceError> {
        let mut tables = self.tables.write();
        let row = tables
            .payments
            .get_mut(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("payment {id}")))?;

        row.status = status;
        if let Some(transaction_id) = transaction_id {
            row.gateway_transaction_id = Some(transaction_id.to_string());
        }
        if let Some(paid_at) = paid_at {
            row.paid_at = Some(paid_at);
        }
        Ok(row.clone())
    }
}

/// Deterministic gateway stand-in.
///
/// Tokens and redirect URLs are derived from the gateway order id, and
/// every call is counted so tests can assert a single checkout session
/// per payment.
pub struct StubCheckoutGateway {
    calls: AtomicUsize,
    fail: RwLock<bool>,
}

impl StubCheckoutGateway {
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: RwLock::new(false),
        }
    }

    /// Make subsequent checkout calls fail.
    pub fn set_failing(&self, fail: bool) {
        *self.fail.write() = fail;
    }

    #[must_use]
    pub fn checkout_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for StubCheckoutGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CheckoutGateway for StubCheckoutGateway {
    async fn create_checkout(
        &self,
        gateway_order_id: &str,
        _amount: Decimal,
        _customer: &Customer,
    ) -> Result<CheckoutSession, ServiceError> {
        if *self.fail.read() {
            return Err(ServiceError::UpstreamUnavailable("checkout gateway down".into()));
        }

        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CheckoutSession {
            token: format!("token-{gateway_order_id}"),
            redirect_url: format!("https://checkout.example/pay/{gateway_order_id}"),
            va_number: Some(format!("8888{gateway_order_id}")),
            qr_code_url: None,
        })
    }
}
