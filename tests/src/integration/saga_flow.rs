//! # Full Saga Happy Path
//!
//! Admission → order creation → asynchronous payment provisioning →
//! checkout initiation → settlement webhook → order finalized as paid.

#[cfg(test)]
mod tests {
    use crate::support::{customer, eventually, Harness};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use shared_types::entities::{NewOrderItem, OrderStatus, PaymentStatus};

    #[tokio::test]
    async fn test_order_to_paid_end_to_end() {
        let h = Harness::start().await;
        let user_id = 7;

        // Admission
        h.container
            .gate
            .admit(user_id, Utc::now().timestamp() as u64)
            .await
            .expect("first request admitted");

        // Order creation: 2 x 50.0 with stock 10
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
            .expect("order created");
        assert_eq!(order.total_price, dec!(100.0));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(
            h.container
                .products
                .get_product_fresh(h.product_id)
                .await
                .unwrap()
                .stock,
            8
        );

        // The consumer provisions the pending payment asynchronously
        let payments = h.container.payments.clone();
        eventually(|| {
            let payments = payments.clone();
            async move { payments.get_payment_by_order_id(order.id).await.is_ok() }
        })
        .await;
        let payment = h
            .container
            .payments
            .get_payment_by_order_id(order.id)
            .await
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.amount, dec!(100.0));

        // Checkout initiation
        let artifacts = h
            .container
            .payments
            .initiate_payment(order.id, "bank_transfer", "bca", &customer())
            .await
            .expect("checkout initiated");
        assert!(!artifacts.token.is_empty());
        assert_eq!(artifacts.status, PaymentStatus::Pending);

        // Settlement webhook flips payment and order to paid
        let gateway_order_id = h
            .container
            .payments
            .get_payment_by_order_id(order.id)
            .await
            .unwrap()
            .gateway_order_id
            .expect("gateway order id persisted");
        h.container
            .payments
            .handle_webhook(&h.notification(&gateway_order_id, "settlement"))
            .await
            .expect("webhook applied");

        let payment = h
            .container
            .payments
            .get_payment_by_order_id(order.id)
            .await
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Paid);
        assert!(payment.paid_at.is_some());

        let order = h
            .container
            .orders
            .get_order_by_id(order.id, user_id)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
    }
}
