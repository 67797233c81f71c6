//! In-memory order store adapter.

use crate::ports::OrderStore;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use shared_types::entities::{NewOrderItem, Order, OrderId, OrderItem, OrderStatus, UserId};
use shared_types::ServiceError;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

struct Tables {
    orders: BTreeMap<OrderId, Order>,
    items: Vec<OrderItem>,
}

/// In-memory stand-in for the order service's relational store.
///
/// A `BTreeMap` keyed by order id gives the identity-ascending iteration
/// order the list query relies on. `fail_next_transaction` injects a
/// mid-write failure for rollback tests.
pub struct InMemoryOrderStore {
    tables: RwLock<Tables>,
    next_id: AtomicU64,
    fail_next_transaction: AtomicBool,
}

impl InMemoryOrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                orders: BTreeMap::new(),
                items: Vec::new(),
            }),
            next_id: AtomicU64::new(1),
            fail_next_transaction: AtomicBool::new(false),
        }
    }

    /// Make the next transactional operation fail with rollback.
    pub fn fail_next_transaction(&self) {
        self.fail_next_transaction.store(true, Ordering::SeqCst);
    }

    fn take_injected_failure(&self) -> bool {
        self.fail_next_transaction.swap(false, Ordering::SeqCst)
    }

    /// All item rows for an order.
    #[must_use]
    pub fn items_for_order(&self, order_id: OrderId) -> Vec<OrderItem> {
        self.tables
            .read()
            .items
            .iter()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect()
    }

    /// Total number of persisted orders (all users).
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.tables.read().orders.len()
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create_order_with_items(
        &self,
        user_id: UserId,
        items: &[NewOrderItem],
        total_price: Decimal,
    ) -> Result<Order, ServiceError> {
        if self.take_injected_failure() {
            return Err(ServiceError::TransactionFailure(
                "store unavailable mid-write".into(),
            ));
        }

        let now = Utc::now();
        let order = Order {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id,
            status: OrderStatus::Pending,
            total_price,
            created_at: now,
            updated_at: now,
        };

        // One lock scope = one transaction: order and items land together.
        let mut tables = self.tables.write();
        tables.orders.insert(order.id, order.clone());
        for item in items {
            tables.items.push(OrderItem {
                order_id: order.id,
                product_id: item.product_id,
                quantity: item.quantity,
            });
        }

        Ok(order)
    }

    async fn orders_by_user(
        &self,
        user_id: UserId,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Order>, ServiceError> {
        Ok(self
            .tables
            .read()
            .orders
            .values()
            .filter(|order| order.user_id == user_id)
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn order_by_id(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, ServiceError> {
        Ok(self
            .tables
            .read()
            .orders
            .get(&order_id)
            .filter(|order| order.user_id == user_id)
            .cloned())
    }

    async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), ServiceError> {
        if self.take_injected_failure() {
            return Err(ServiceError::TransactionFailure(
                "store unavailable mid-write".into(),
            ));
        }

        let mut tables = self.tables.write();
        match tables.orders.get_mut(&order_id) {
            Some(order) => {
                order.status = status;
                order.updated_at = Utc::now();
                Ok(())
            }
            None => Err(ServiceError::NotFound(format!("order {order_id}"))),
        }
    }
}
