//! Shared fixtures for the integration suite.

use chrono::Utc;
use commerce_runtime::{run_consumer, RuntimeConfig, ServiceContainer};
use payment_service::{Customer, WebhookNotification};
use rust_decimal_macros::dec;
use sha2::{Digest, Sha512};
use shared_bus::EventTopic;
use shared_types::entities::{Product, ProductId};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A fully wired single-process deployment with the order-events
/// consumer running and one product seeded (price 50.0, stock 10).
pub struct Harness {
    pub container: ServiceContainer,
    pub config: RuntimeConfig,
    pub product_id: ProductId,
    consumer: JoinHandle<()>,
}

impl Harness {
    pub async fn start() -> Self {
        Self::start_with(RuntimeConfig::default()).await
    }

    pub async fn start_with(config: RuntimeConfig) -> Self {
        let container = ServiceContainer::new(&config);
        let subscription = container.bus.subscribe(EventTopic::OrderEvents);
        let consumer = tokio::spawn(run_consumer(subscription, container.payments.clone()));

        let now = Utc::now();
        let product = container
            .products
            .create_product(Product {
                id: 0,
                name: "widget".to_string(),
                description: "a widget".to_string(),
                price: dec!(50.0),
                stock: 10,
                created_at: now,
                updated_at: now,
            })
            .await
            .expect("seed product");

        Self {
            container,
            config,
            product_id: product.id,
            consumer,
        }
    }

    /// Sign a webhook payload the way the gateway does.
    pub fn sign(&self, order_id: &str, status_code: &str, gross_amount: &str) -> String {
        let mut hasher = Sha512::new();
        hasher.update(order_id.as_bytes());
        hasher.update(status_code.as_bytes());
        hasher.update(gross_amount.as_bytes());
        hasher.update(self.config.server_key.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// A correctly signed notification for the given gateway order id.
    pub fn notification(&self, gateway_order_id: &str, transaction_status: &str) -> WebhookNotification {
        WebhookNotification {
            order_id: gateway_order_id.to_string(),
            transaction_id: Some("txn-1".to_string()),
            transaction_status: transaction_status.to_string(),
            payment_type: Some("bank_transfer".to_string()),
            gross_amount: "100.0".to_string(),
            signature_key: self.sign(gateway_order_id, "200", "100.0"),
            fraud_status: None,
            status_code: "200".to_string(),
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.consumer.abort();
    }
}

/// Customer used across the suite.
pub fn customer() -> Customer {
    Customer {
        name: "Jo".to_string(),
        email: "jo@example.com".to_string(),
        phone: "+62080000".to_string(),
    }
}

/// Poll until `check` succeeds or a second passes. Event consumption is
/// asynchronous; polling beats fixed sleeps for suite latency.
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    loop {
        if check().await {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached within deadline"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
