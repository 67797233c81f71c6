//! Outbound port: the product store.

use async_trait::async_trait;
use shared_types::entities::{Product, ProductId};
use shared_types::ServiceError;

/// Relational store owned by the product service.
///
/// Store failures surface as `ServiceError::TransactionFailure`; an
/// absent product as `ServiceError::NotFound`.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a new product, returning it with its assigned identity.
    async fn insert(&self, product: Product) -> Result<Product, ServiceError>;

    /// Fetch a product by identity.
    async fn get(&self, id: ProductId) -> Result<Product, ServiceError>;

    /// Persist updated product fields (price, stock, metadata).
    async fn update(&self, product: &Product) -> Result<(), ServiceError>;
}
