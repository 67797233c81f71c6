//! # At-Least-Once Delivery Safety
//!
//! Redelivered events, retried initiations, and duplicate webhooks must
//! all collapse to a single effect.

#[cfg(test)]
mod tests {
    use crate::support::{customer, eventually, Harness};
    use rust_decimal_macros::dec;
    use shared_bus::{EventPublisher, OrderEvent};
    use shared_types::entities::{NewOrderItem, OrderStatus, PaymentStatus};

    #[tokio::test]
    async fn test_duplicate_event_delivery_creates_one_payment() {
        let h = Harness::start().await;

        let event = OrderEvent::OrderCreated {
            order_id: 42,
            user_id: 7,
            total_price: dec!(100.0),
        };
        h.container.bus.publish(event.clone()).await;
        h.container.bus.publish(event.clone()).await;
        h.container.bus.publish(event).await;

        let payments = h.container.payments.clone();
        eventually(|| {
            let payments = payments.clone();
            async move { payments.get_payment_by_order_id(42).await.is_ok() }
        })
        .await;

        assert_eq!(h.container.payment_store.payment_count(), 1);
    }

    #[tokio::test]
    async fn test_double_initiation_returns_same_session() {
        let h = Harness::start().await;
        h.container
            .bus
            .publish(OrderEvent::OrderCreated {
                order_id: 42,
                user_id: 7,
                total_price: dec!(100.0),
            })
            .await;
        let payments = h.container.payments.clone();
        eventually(|| {
            let payments = payments.clone();
            async move { payments.get_payment_by_order_id(42).await.is_ok() }
        })
        .await;

        let first = h
            .container
            .payments
            .initiate_payment(42, "bank_transfer", "bca", &customer())
            .await
            .unwrap();
        let second = h
            .container
            .payments
            .initiate_payment(42, "bank_transfer", "bca", &customer())
            .await
            .unwrap();

        assert_eq!(first.token, second.token);
        assert_eq!(first.redirect_url, second.redirect_url);
        // The gateway saw exactly one checkout creation
        assert_eq!(h.container.checkout_gateway.checkout_calls(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_settlement_webhook_is_noop() {
        let h = Harness::start().await;
        let user_id = 7;
        let order = h
            .container
            .orders
            .create_order(
                user_id,
                &[NewOrderItem {
                    product_id: h.product_id,
                    quantity: 2,
                }],
            )
            .await
            .unwrap();
        let payments = h.container.payments.clone();
        eventually(|| {
            let payments = payments.clone();
            async move { payments.get_payment_by_order_id(order.id).await.is_ok() }
        })
        .await;
        h.container
            .payments
            .initiate_payment(order.id, "bank_transfer", "bca", &customer())
            .await
            .unwrap();
        let gateway_order_id = h
            .container
            .payments
            .get_payment_by_order_id(order.id)
            .await
            .unwrap()
            .gateway_order_id
            .unwrap();

        let settlement = h.notification(&gateway_order_id, "settlement");
        h.container.payments.handle_webhook(&settlement).await.unwrap();
        let first_applied = h
            .container
            .payments
            .get_payment_by_order_id(order.id)
            .await
            .unwrap();

        // Redelivery is acknowledged without touching the row
        h.container.payments.handle_webhook(&settlement).await.unwrap();
        let after_redelivery = h
            .container
            .payments
            .get_payment_by_order_id(order.id)
            .await
            .unwrap();

        assert_eq!(first_applied, after_redelivery);
        assert_eq!(after_redelivery.status, PaymentStatus::Paid);
        assert_eq!(
            h.container
                .orders
                .get_order_by_id(order.id, user_id)
                .await
                .unwrap()
                .status,
            OrderStatus::Paid
        );
    }
}
