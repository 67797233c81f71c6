//! # Cache/Database Consistency
//!
//! Every mutating saga step invalidates the views it staled; no read
//! after a mutation may observe pre-mutation data.

#[cfg(test)]
mod tests {
    use crate::support::{customer, eventually, Harness};
    use shared_types::entities::{NewOrderItem, OrderStatus, PaymentStatus};

    fn one_widget(h: &Harness) -> Vec<NewOrderItem> {
        vec![NewOrderItem {
            product_id: h.product_id,
            quantity: 1,
        }]
    }

    #[tokio::test]
    async fn test_no_stale_list_after_create_order() {
        let h = Harness::start().await;
        let user_id = 7;

        h.container.orders.create_order(user_id, &one_widget(&h)).await.unwrap();
        // Populate the list-page cache
        let first = h.container.orders.get_orders_by_user(user_id, 0).await.unwrap();
        assert_eq!(first.len(), 1);

        h.container.orders.create_order(user_id, &one_widget(&h)).await.unwrap();
        let second = h.container.orders.get_orders_by_user(user_id, 0).await.unwrap();
        assert_eq!(second.len(), 2);
    }

    #[tokio::test]
    async fn test_no_stale_views_after_status_update() {
        let h = Harness::start().await;
        let user_id = 7;
        let order = h
            .container
            .orders
            .create_order(user_id, &one_widget(&h))
            .await
            .unwrap();

        // Populate both cached views while the order is pending
        assert_eq!(
            h.container
                .orders
                .get_order_by_id(order.id, user_id)
                .await
                .unwrap()
                .status,
            OrderStatus::Pending
        );
        h.container.orders.get_orders_by_user(user_id, 0).await.unwrap();

        h.container
            .orders
            .update_order_status(order.id, OrderStatus::Paid)
            .await
            .unwrap();

        let single = h
            .container
            .orders
            .get_order_by_id(order.id, user_id)
            .await
            .unwrap();
        assert_eq!(single.status, OrderStatus::Paid);
        let list = h.container.orders.get_orders_by_user(user_id, 0).await.unwrap();
        assert_eq!(list[0].status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_no_stale_payment_after_webhook() {
        let h = Harness::start().await;
        let order = h
            .container
            .orders
            .create_order(7, &one_widget(&h))
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
        // Cache the pending view
        let pending = h
            .container
            .payments
            .get_payment_by_order_id(order.id)
            .await
            .unwrap();
        assert_eq!(pending.status, PaymentStatus::Pending);

        let gateway_order_id = pending.gateway_order_id.unwrap();
        let mut settlement = h.notification(&gateway_order_id, "settlement");
        settlement.gross_amount = "50.0".to_string();
        settlement.signature_key = h.sign(&gateway_order_id, "200", "50.0");
        h.container.payments.handle_webhook(&settlement).await.unwrap();

        let fresh = h
            .container
            .payments
            .get_payment_by_order_id(order.id)
            .await
            .unwrap();
        assert_eq!(fresh.status, PaymentStatus::Paid);
    }
}
