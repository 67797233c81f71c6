//! Runtime entry point: wires the services and drives one full saga
//! end to end as a smoke demonstration.

use anyhow::{Context, Result};
use chrono::Utc;
use commerce_runtime::{run_consumer, RuntimeConfig, ServiceContainer};
use payment_service::{Customer, WebhookNotification};
use rust_decimal_macros::dec;
use sha2::{Digest, Sha512};
use shared_bus::EventTopic;
use shared_types::entities::{NewOrderItem, Product};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Sign a webhook payload the way the gateway does.
fn sign(server_key: &str, order_id: &str, status_code: &str, gross_amount: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = RuntimeConfig::from_env();
    let container = ServiceContainer::new(&config);

    // Start the order-events consumer before any order is created
    let subscription = container.bus.subscribe(EventTopic::OrderEvents);
    tokio::spawn(run_consumer(subscription, container.payments.clone()));

    // Seed the catalog
    let now = Utc::now();
    let product = container
        .products
        .create_product(Product {
            id: 0,
            name: "mechanical keyboard".to_string(),
            description: "85-key, hot-swappable".to_string(),
            price: dec!(50.0),
            stock: 10,
            created_at: now,
            updated_at: now,
        })
        .await
        .context("seeding catalog")?;
    info!(product_id = product.id, "Catalog seeded");

    // Admission, then order creation
    let user_id = 7;
    container
        .gate
        .admit(user_id, Utc::now().timestamp() as u64)
        .await
        .context("admission")?;
    let order = container
        .orders
        .create_order(
            user_id,
            &[NewOrderItem {
                product_id: product.id,
                quantity: 2,
            }],
        )
        .await
        .context("order creation")?;
    info!(order_id = order.id, total = %order.total_price, "Order committed");

    // Let the consumer provision the pending payment
    tokio::time::sleep(Duration::from_millis(100)).await;

    let artifacts = container
        .payments
        .initiate_payment(
            order.id,
            "bank_transfer",
            "bca",
            &Customer {
                name: "Demo Customer".to_string(),
                email: "demo@example.com".to_string(),
                phone: "+62080000".to_string(),
            },
        )
        .await
        .context("checkout initiation")?;
    info!(token = %artifacts.token, "Checkout session ready");

    // Simulate the gateway's settlement webhook
    let payment = container.payments.get_payment_by_order_id(order.id).await?;
    let gateway_order_id = payment
        .gateway_order_id
        .context("initiated payment has a gateway order id")?;
    let gross_amount = payment.amount.to_string();
    container
        .payments
        .handle_webhook(&WebhookNotification {
            order_id: gateway_order_id.clone(),
            transaction_id: Some("demo-txn-1".to_string()),
            transaction_status: "settlement".to_string(),
            payment_type: Some("bank_transfer".to_string()),
            gross_amount: gross_amount.clone(),
            signature_key: sign(&config.server_key, &gateway_order_id, "200", &gross_amount),
            fraud_status: None,
            status_code: "200".to_string(),
        })
        .await
        .context("webhook reconciliation")?;

    let order = container.orders.get_order_by_id(order.id, user_id).await?;
    let payment = container.payments.get_payment_by_order_id(order.id).await?;
    info!(
        order_status = %order.status,
        payment_status = %payment.status,
        stock_left = container.products.get_product_fresh(product.id).await?.stock,
        "Saga complete"
    );

    Ok(())
}
