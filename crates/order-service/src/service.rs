//! The order coordinator.

use crate::ports::{OrderStore, ProductClient};
use crate::{PAGE_SIZE, RPC_TIMEOUT};
use cache_layer::{keys, CacheLayer, ORDER_LIST_TTL, ORDER_TTL};
use chrono::Utc;
use rust_decimal::Decimal;
use shared_bus::{EventPublisher, OrderEvent};
use shared_types::entities::{NewOrderItem, Order, OrderId, OrderStatus, Product, UserId};
use shared_types::ServiceError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Parse a client-supplied offset string.
///
/// Lives here so every transport binding rejects malformed paging input
/// the same way, before any side effect.
pub fn parse_offset(raw: &str) -> Result<u64, ServiceError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ServiceError::Validation(format!("unparseable offset: {raw:?}")))
}

/// Coordinates the order half of the saga.
///
/// All collaborators are injected at construction: the order store, the
/// product service RPC link, the event bus, and the cache.
pub struct OrderCoordinator {
    store: Arc<dyn OrderStore>,
    products: Arc<dyn ProductClient>,
    bus: Arc<dyn EventPublisher>,
    cache: CacheLayer,
    rpc_timeout: Duration,
}

impl OrderCoordinator {
    #[must_use]
    pub fn new(
        store: Arc<dyn OrderStore>,
        products: Arc<dyn ProductClient>,
        bus: Arc<dyn EventPublisher>,
        cache: CacheLayer,
    ) -> Self {
        Self {
            store,
            products,
            bus,
            cache,
            rpc_timeout: RPC_TIMEOUT,
        }
    }

    /// Override the RPC bound (tests use a tight one).
    #[must_use]
    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    /// Bound an RPC future; a timeout surfaces as `UpstreamUnavailable`.
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

    /// Create an order for `user_id`.
    ///
    /// Stock is validated and the total computed from current
    /// server-held prices before anything is written; the order and its
    /// items then commit atomically. The stock decrement and the event
    /// publish happen after the commit and are not unwound on failure.
    pub async fn create_order(
        &self,
        user_id: UserId,
        items: &[NewOrderItem],
    ) -> Result<Order, ServiceError> {
        if items.is_empty() {
            return Err(ServiceError::Validation("order has no items".into()));
        }
        if let Some(item) = items.iter().find(|item| item.quantity == 0) {
            return Err(ServiceError::Validation(format!(
                "zero quantity for product {}",
                item.product_id
            )));
        }

        // 1-2. Fetch current price/stock per item and compute the total
        // server-side. These reads are uncached on purpose.
        debug!(user_id, "Calculating total price");
        let mut total_price = Decimal::ZERO;
        let mut fetched: Vec<Product> = Vec::with_capacity(items.len());
        for item in items {
            let product = self
                .rpc("product lookup", self.products.get_product(item.product_id))
                .await?;

            if product.stock < item.quantity {
                return Err(ServiceError::InsufficientStock {
                    product_id: product.id,
                    requested: item.quantity,
                    available: product.stock,
                });
            }

            total_price += Decimal::from(item.quantity) * product.price;
            fetched.push(product);
        }

        // 3. Order + items commit together; any failure aborts the
        // whole creation with nothing persisted.
        let order = self
            .store
            .create_order_with_items(user_id, items, total_price)
            .await?;
        info!(order_id = order.id, user_id, %total_price, "Order created");

        // 4. Decrement stock per item. Outside the local transaction:
        // a failure here leaves the committed order without a stock
        // deduction (accepted gap, logged).
        for (product, item) in fetched.iter().zip(items) {
            let mut updated = product.clone();
            updated.stock -= item.quantity;
            updated.updated_at = Utc::now();

            if let Err(e) = self
                .rpc("stock decrement", self.products.update_product(&updated))
                .await
            {
                error!(
                    order_id = order.id,
                    product_id = product.id,
                    error = %e,
                    "Stock decrement failed after order commit"
                );
            }
        }

        // 5. Best-effort event publish; a missed event means no payment
        // row is ever provisioned for this order (accepted gap, logged).
        let receivers = self
            .bus
            .publish(OrderEvent::OrderCreated {
                order_id: order.id,
                user_id,
                total_price,
            })
            .await;
        if receivers == 0 {
            warn!(order_id = order.id, "Order-created event reached no consumers");
        }

        // 6. The user's cached list pages are now stale.
        self.cache
            .delete_by_pattern(&keys::user_orders_prefix(user_id))
            .await;

        Ok(order)
    }

    /// Page of a user's orders, read-through cached per `(user, page)`.
    pub async fn get_orders_by_user(
        &self,
        user_id: UserId,
        offset: u64,
    ) -> Result<Vec<Order>, ServiceError> {
        let page = offset / PAGE_SIZE + 1;
        let key = keys::user_orders_page(user_id, page);

        if let Some(cached) = self.cache.get_json::<Vec<Order>>(&key).await {
            debug!(user_id, page, "Cache hit for order list");
            return Ok(cached);
        }
        debug!(user_id, page, "Cache miss for order list");

        let orders = self.store.orders_by_user(user_id, offset, PAGE_SIZE).await?;
        self.cache.set_json(&key, &orders, ORDER_LIST_TTL).await;
        Ok(orders)
    }

    /// Single-order lookup, read-through cached per order identity.
    pub async fn get_order_by_id(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<Order, ServiceError> {
        let key = keys::order(order_id);

        if let Some(cached) = self.cache.get_json::<Order>(&key).await {
            debug!(order_id, "Cache hit for order");
            // The cache is keyed by order only; ownership still applies.
            if cached.user_id != user_id {
                return Err(ServiceError::NotFound(format!("order {order_id}")));
            }
            return Ok(cached);
        }
        debug!(order_id, "Cache miss for order");

        let order = self
            .store
            .order_by_id(order_id, user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("order {order_id}")))?;

        self.cache.set_json(&key, &order, ORDER_TTL).await;
        Ok(order)
    }

    /// Propagate a reconciliation outcome onto the order.
    ///
    /// Called by the payment reconciler over the RPC seam; never by
    /// clients. Invalidates both the single-order view and every list
    /// page (status changes are visible in both).
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), ServiceError> {
        self.store.update_status(order_id, status).await?;
        info!(order_id, status = %status, "Order status updated");

        self.cache.delete(&keys::order(order_id)).await;
        // The call does not carry the owning user, so the sweep covers
        // every user's pages.
        self.cache
            .delete_by_pattern(keys::all_user_orders_prefix())
            .await;
        Ok(())
    }
}
