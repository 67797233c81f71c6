//! # Aborts, Rejections, and Terminal States
//!
//! Failures must leave no partial state behind, and terminal payments
//! must absorb everything that arrives late.

#[cfg(test)]
mod tests {
    use crate::support::{customer, eventually, Harness};
    use shared_types::entities::{NewOrderItem, PaymentStatus};
    use shared_types::ServiceError;

    /// Create an order, wait for provisioning, initiate checkout, and
    /// return `(order_id, gateway_order_id)`.
    async fn initiated_order(h: &Harness) -> (u64, String) {
        let order = h
            .container
            .orders
            .create_order(
                7,
                &[NewOrderItem {
                    product_id: h.product_id,
                    quantity: 2,
                }],
            )
            .await
            .unwrap();
        let payments = h.container.payments.clone();
        let order_id = order.id;
        eventually(|| {
            let payments = payments.clone();
            async move { payments.get_payment_by_order_id(order_id).await.is_ok() }
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
        (order.id, gateway_order_id)
    }

    #[tokio::test]
    async fn test_invalid_signature_mutates_nothing() {
        let h = Harness::start().await;
        let (order_id, gateway_order_id) = initiated_order(&h).await;

        let mut forged = h.notification(&gateway_order_id, "settlement");
        forged.signature_key = "deadbeef".to_string();

        assert!(matches!(
            h.container.payments.handle_webhook(&forged).await,
            Err(ServiceError::InvalidSignature)
        ));
        assert_eq!(
            h.container
                .payments
                .get_payment_by_order_id(order_id)
                .await
                .unwrap()
                .status,
            PaymentStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_insufficient_stock_aborts_before_any_write() {
        let h = Harness::start().await;

        // Seeded stock is 10
        let result = h
            .container
            .orders
            .create_order(
                7,
                &[NewOrderItem {
                    product_id: h.product_id,
                    quantity: 11,
                }],
            )
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::InsufficientStock { requested: 11, available: 10, .. })
        ));

        // No order row, no stock change, no payment provisioned
        assert!(h.container.orders.get_orders_by_user(7, 0).await.unwrap().is_empty());
        assert_eq!(
            h.container
                .products
                .get_product_fresh(h.product_id)
                .await
                .unwrap()
                .stock,
            10
        );
        assert_eq!(h.container.payment_store.payment_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_payment_absorbs_late_settlement() {
        let h = Harness::start().await;
        let (order_id, gateway_order_id) = initiated_order(&h).await;

        h.container
            .payments
            .handle_webhook(&h.notification(&gateway_order_id, "expire"))
            .await
            .unwrap();
        // Gateway retries with a contradictory outcome
        h.container
            .payments
            .handle_webhook(&h.notification(&gateway_order_id, "settlement"))
            .await
            .unwrap();

        assert_eq!(
            h.container
                .payments
                .get_payment_by_order_id(order_id)
                .await
                .unwrap()
                .status,
            PaymentStatus::Failed
        );
    }

    #[tokio::test]
    async fn test_initiation_against_missing_payment_rejected() {
        let h = Harness::start().await;
        assert!(matches!(
            h.container
                .payments
                .initiate_payment(999, "bank_transfer", "bca", &customer())
                .await,
            Err(ServiceError::PaymentNotFound(999))
        ));
    }
}
