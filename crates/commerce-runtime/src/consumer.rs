//! Order-events consumer loop.

use payment_service::PaymentReconciler;
use shared_bus::Subscription;
use std::sync::Arc;
use tracing::{error, info};

/// Drive the reconciler from the order-events topic.
///
/// This is the at-least-once delivery surface: every received event is
/// handed to `on_order_created`, which must absorb redelivery. Handler
/// errors are logged and the loop continues; it exits only when the bus
/// itself is dropped.
pub async fn run_consumer(mut subscription: Subscription, reconciler: Arc<PaymentReconciler>) {
    info!(topic = subscription.topic().as_str(), "Order-events consumer started");

    while let Some(event) = subscription.recv().await {
        if let Err(e) = reconciler.on_order_created(&event).await {
            error!(
                order_id = event.order_id(),
                error = %e,
                "Failed to provision payment for order event"
            );
        }
    }

    info!("Order-events consumer stopped (bus closed)");
}
