//! Product service operations.

use crate::ports::ProductStore;
use cache_layer::{keys, CacheLayer, PRODUCT_TTL};
use shared_types::entities::{Product, ProductId};
use shared_types::ServiceError;
use std::sync::Arc;
use tracing::{debug, info};

/// Product catalog service.
///
/// Dependencies are injected at construction; there is no ambient
/// global store or cache handle.
pub struct ProductService {
    store: Arc<dyn ProductStore>,
    cache: CacheLayer,
}

impl ProductService {
    #[must_use]
    pub fn new(store: Arc<dyn ProductStore>, cache: CacheLayer) -> Self {
        Self { store, cache }
    }

    /// Create a product and invalidate the list pages it now belongs on.
    pub async fn create_product(&self, product: Product) -> Result<Product, ServiceError> {
        let created = self.store.insert(product).await?;
        info!(product_id = created.id, "Product created");

        self.cache
            .delete_by_pattern(keys::products_list_prefix())
            .await;
        Ok(created)
    }

    /// Read-through product lookup on `product:<id>`.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ServiceError> {
        let key = keys::product(id);

        if let Some(cached) = self.cache.get_json::<Product>(&key).await {
            debug!(product_id = id, "Cache hit for product");
            return Ok(cached);
        }
        debug!(product_id = id, "Cache miss for product");

        let product = self.store.get(id).await?;
        self.cache.set_json(&key, &product, PRODUCT_TTL).await;
        Ok(product)
    }

    /// Uncached lookup. Stock validation reads go through here: the
    /// coordinator must see current stock, not a cached copy.
    pub async fn get_product_fresh(&self, id: ProductId) -> Result<Product, ServiceError> {
        self.store.get(id).await
    }

    /// Persist a product mutation (price, stock, metadata) and
    /// invalidate the single-product key plus every list page.
    pub async fn update_product(&self, product: &Product) -> Result<(), ServiceError> {
        self.store.update(product).await?;
        info!(product_id = product.id, stock = product.stock, "Product updated");

        self.cache.delete(&keys::product(product.id)).await;
        self.cache
            .delete_by_pattern(keys::products_list_prefix())
            .await;
        Ok(())
    }
}
