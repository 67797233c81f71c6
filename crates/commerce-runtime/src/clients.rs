//! In-process adapters closing the RPC seams.
//!
//! In a multi-process deployment these become network clients; the
//! service code on either side of the seam is unchanged.

use async_trait::async_trait;
use order_service::{OrderCoordinator, ProductClient};
use payment_service::OrderStatusClient;
use product_service::ProductService;
use shared_types::entities::{OrderId, OrderStatus, Product, ProductId};
use shared_types::ServiceError;
use std::sync::Arc;

/// Product-service client backed by a direct call.
pub struct LocalProductClient {
    inner: Arc<ProductService>,
}

impl LocalProductClient {
    #[must_use]
    pub fn new(inner: Arc<ProductService>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ProductClient for LocalProductClient {
    async fn get_product(&self, id: ProductId) -> Result<Product, ServiceError> {
        // Stock checks need current data, so this bypasses the cache
        self.inner.get_product_fresh(id).await
    }

    async fn update_product(&self, product: &Product) -> Result<(), ServiceError> {
        self.inner.update_product(product).await
    }
}

/// Order-coordinator client backed by a direct call.
pub struct LocalOrderStatusClient {
    inner: Arc<OrderCoordinator>,
}

impl LocalOrderStatusClient {
    #[must_use]
    pub fn new(inner: Arc<OrderCoordinator>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl OrderStatusClient for LocalOrderStatusClient {
    async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), ServiceError> {
        self.inner.update_order_status(order_id, status).await
    }
}
