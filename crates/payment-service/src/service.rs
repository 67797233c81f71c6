//! The payment reconciler.

use crate::gateway::{
    derive_gateway_order_id, map_transaction_status, parse_gateway_order_id, verify_signature,
    CheckoutGateway, Customer, WebhookNotification, TEST_NOTIFICATION_PREFIX,
};
use crate::ports::{OrderStatusClient, PaymentCreateError, PaymentStore};
use crate::{CHECKOUT_EXPIRY, RPC_TIMEOUT};
use cache_layer::{keys, CacheLayer, PAYMENT_TTL};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use shared_bus::OrderEvent;
use shared_types::entities::{OrderId, OrderStatus, Payment, PaymentStatus};
use shared_types::{ServiceError, DEFAULT_CURRENCY};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What checkout initiation hands back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutArtifacts {
    pub token: String,
    pub redirect_url: String,
    pub va_number: Option<String>,
    pub qr_code_url: Option<String>,
    pub expired_at: Option<DateTime<Utc>>,
    pub status: PaymentStatus,
}

impl CheckoutArtifacts {
    fn from_payment(payment: &Payment) -> Option<Self> {
        Some(Self {
            token: payment.gateway_token.clone()?,
            redirect_url: payment.gateway_redirect_url.clone().unwrap_or_default(),
            va_number: payment.va_number.clone(),
            qr_code_url: payment.qr_code_url.clone(),
            expired_at: payment.expired_at,
            status: payment.status,
        })
    }
}

/// Consumes order-created events, drives hosted checkout, and applies
/// webhook outcomes idempotently.
pub struct PaymentReconciler {
    store: Arc<dyn PaymentStore>,
    gateway: Arc<dyn CheckoutGateway>,
    orders: Arc<dyn OrderStatusClient>,
    cache: CacheLayer,
    /// Shared secret the gateway signs webhook payloads with.
    server_key: String,
    rpc_timeout: Duration,
}

impl PaymentReconciler {
    #[must_use]
    pub fn new(
        store: Arc<dyn PaymentStore>,
        gateway: Arc<dyn CheckoutGateway>,
        orders: Arc<dyn OrderStatusClient>,
        cache: CacheLayer,
        server_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            gateway,
            orders,
            cache,
            server_key: server_key.into(),
            rpc_timeout: RPC_TIMEOUT,
        }
    }

    /// Override the RPC bound (tests use a tight one).
    #[must_use]
    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    async fn rpc<T, F>(&self, what: &str, fut: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, ServiceError>> + Send,
    {
        match tokio::time::timeout(self.rpc_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::UpstreamUnavailable(format!(
                "{what} timed out"
            ))),
        }
    }

    /// Consumer callback for an order-created event.
    ///
    /// At-least-once delivery means this can run more than once for the
    /// same order; the store's uniqueness constraint on `order_id` is
    /// the idempotency guard, so a duplicate is a logged no-op.
    pub async fn on_order_created(&self, event: &OrderEvent) -> Result<(), ServiceError> {
        let OrderEvent::OrderCreated {
            order_id,
            user_id,
            total_price,
        } = event;

        match self
            .store
            .create(*order_id, *total_price, DEFAULT_CURRENCY)
            .await
        {
            Ok(payment) => {
                info!(
                    payment_id = payment.id,
                    order_id, user_id, "Pending payment provisioned"
                );
                Ok(())
            }
            Err(PaymentCreateError::DuplicateOrder(order_id)) => {
                debug!(order_id, "Redelivered order-created event, payment exists");
                Ok(())
            }
            Err(PaymentCreateError::Store(e)) => Err(e),
        }
    }

    /// Payment lookup, read-through cached per owning order.
    pub async fn get_payment_by_order_id(
        &self,
        order_id: OrderId,
    ) -> Result<Payment, ServiceError> {
        let key = keys::payment_by_order(order_id);

        if let Some(cached) = self.cache.get_json::<Payment>(&key).await {
            debug!(order_id, "Cache hit for payment");
            return Ok(cached);
        }
        debug!(order_id, "Cache miss for payment");

        let payment = self
            .store
            .get_by_order_id(order_id)
            .await?
            .ok_or(ServiceError::PaymentNotFound(order_id))?;

        self.cache.set_json(&key, &payment, PAYMENT_TTL).await;
        Ok(payment)
    }

    /// Initiate hosted checkout for an order's payment.
    ///
    /// Idempotent on client retry: when a token already exists and the
    /// payment is still pending, the existing artifacts come back
    /// unchanged and the gateway is not called again.
    pub async fn initiate_payment(
        &self,
        order_id: OrderId,
        method: &str,
        channel: &str,
        customer: &Customer,
    ) -> Result<CheckoutArtifacts, ServiceError> {
        let mut payment = self
            .store
            .get_by_order_id(order_id)
            .await?
            .ok_or(ServiceError::PaymentNotFound(order_id))?;

        if payment.status == PaymentStatus::Paid {
            return Err(ServiceError::AlreadyCompleted(order_id));
        }

        if payment.status == PaymentStatus::Pending {
            if let Some(existing) = CheckoutArtifacts::from_payment(&payment) {
                debug!(
                    payment_id = payment.id,
                    order_id, "Re-initiation, returning existing checkout session"
                );
                return Ok(existing);
            }
        }

        let gateway_order_id = derive_gateway_order_id(payment.id, Utc::now().timestamp());
        let session = self
            .rpc(
                "checkout creation",
                self.gateway
                    .create_checkout(&gateway_order_id, payment.amount, customer),
            )
            .await?;

        payment.payment_method = Some(method.to_string());
        payment.payment_channel = Some(channel.to_string());
        payment.gateway_order_id = Some(gateway_order_id.clone());
        payment.gateway_token = Some(session.token.clone());
        payment.gateway_redirect_url = Some(session.redirect_url.clone());
        payment.va_number = session.va_number.clone();
        payment.qr_code_url = session.qr_code_url.clone();
        payment.expired_at =
            Some(Utc::now() + ChronoDuration::seconds(CHECKOUT_EXPIRY.as_secs() as i64));

        self.store.update_gateway_fields(&payment).await?;
        self.cache.delete(&keys::payment_by_order(order_id)).await;
        info!(
            payment_id = payment.id,
            order_id, gateway_order_id, "Checkout session created"
        );

        Ok(CheckoutArtifacts {
            token: session.token,
            redirect_url: session.redirect_url,
            va_number: session.va_number,
            qr_code_url: session.qr_code_url,
            expired_at: payment.expired_at,
            status: payment.status,
        })
    }

    /// Apply a gateway webhook.
    ///
    /// Safe against repeated and concurrent delivery: a terminal
    /// payment absorbs any later notification as an acknowledged no-op.
    pub async fn handle_webhook(
        &self,
        notification: &WebhookNotification,
    ) -> Result<(), ServiceError> {
        // 1. Authenticate before anything else
        verify_signature(
            &self.server_key,
            &notification.order_id,
            &notification.status_code,
            &notification.gross_amount,
            &notification.signature_key,
        )?;

        // 2. Map the gateway vocabulary
        let mapped = map_transaction_status(
            &notification.transaction_status,
            notification.fraud_status.as_deref(),
        );

        // 3. Gateway connectivity tests never touch stored state
        if notification.order_id.starts_with(TEST_NOTIFICATION_PREFIX) {
            debug!(gateway_order_id = %notification.order_id, "Test notification acknowledged");
            return Ok(());
        }

        // 4. Resolve the payment; fall back to the literal identifier
        // for payments initiated before the PAY-<id>-<ts> format
        let payment = match parse_gateway_order_id(&notification.order_id) {
            Some(payment_id) => self.store.get_by_id(payment_id).await?,
            None => {
                self.store
                    .get_by_gateway_order_id(&notification.order_id)
                    .await?
            }
        }
        .ok_or_else(|| {
            ServiceError::NotFound(format!("payment for gateway order {}", notification.order_id))
        })?;

        // 5. Terminal states absorb redelivery
        if payment.status.is_terminal() {
            debug!(
                payment_id = payment.id,
                status = %payment.status,
                "Webhook for terminal payment, acknowledged as no-op"
            );
            return Ok(());
        }

        let paid_at = (mapped == PaymentStatus::Paid).then(Utc::now);
        let payment = self
            .store
            .update_status(
                payment.id,
                mapped,
                notification.transaction_id.as_deref(),
                paid_at,
            )
            .await?;
        self.cache
            .delete(&keys::payment_by_order(payment.order_id))
            .await;
        info!(
            payment_id = payment.id,
            order_id = payment.order_id,
            status = %mapped,
            "Webhook applied"
        );

        // 6. Propagate terminal outcomes onto the order. A stuck paid
        // order is worth a webhook retry; a stuck failed order is not.
        // Note the retry's limit: the payment is already terminal by
        // then, so a redelivered webhook lands on the no-op at step 5
        // and does not re-attempt this propagation.
        match mapped {
            PaymentStatus::Paid => {
                if let Err(e) = self
                    .rpc(
                        "order-status propagation",
                        self.orders
                            .update_order_status(payment.order_id, OrderStatus::Paid),
                    )
                    .await
                {
                    error!(
                        order_id = payment.order_id,
                        error = %e,
                        "Failed to propagate paid status"
                    );
                    return Err(e);
                }
            }
            PaymentStatus::Failed => {
                if let Err(e) = self
                    .rpc(
                        "order-status propagation",
                        self.orders
                            .update_order_status(payment.order_id, OrderStatus::Failed),
                    )
                    .await
                {
                    warn!(
                        order_id = payment.order_id,
                        error = %e,
                        "Failed to propagate failed status"
                    );
                }
            }
            PaymentStatus::Pending | PaymentStatus::Refunded => {}
        }

        Ok(())
    }
}
