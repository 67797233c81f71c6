//! Ports for the order coordinator.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared_types::entities::{NewOrderItem, Order, OrderId, OrderStatus, Product, ProductId, UserId};
use shared_types::ServiceError;

/// Relational store owned by the order service.
///
/// `create_order_with_items` is the one atomic operation the saga needs
/// locally: the order row and every item row commit together or not at
/// all. No partial order is ever visible.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert an order with status pending plus one row per item, as a
    /// single transaction. Returns the created order.
    async fn create_order_with_items(
        &self,
        user_id: UserId,
        items: &[NewOrderItem],
        total_price: Decimal,
    ) -> Result<Order, ServiceError>;

    /// Page of a user's orders, ordered by identity ascending.
    async fn orders_by_user(
        &self,
        user_id: UserId,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Order>, ServiceError>;

    /// Fetch an order visible to the given user.
    async fn order_by_id(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, ServiceError>;

    /// Transactionally update status and the updated-at timestamp.
    async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), ServiceError>;
}

/// RPC link to the product service.
///
/// Calls are bounded by `RPC_TIMEOUT` at the coordinator; a timeout or
/// connection failure surfaces as `UpstreamUnavailable`.
#[async_trait]
pub trait ProductClient: Send + Sync {
    /// Current price and stock. Deliberately uncached on the serving
    /// side: stock checking needs current data.
    async fn get_product(&self, id: ProductId) -> Result<Product, ServiceError>;

    /// Persist updated product fields (used for the stock decrement).
    async fn update_product(&self, product: &Product) -> Result<(), ServiceError>;
}
