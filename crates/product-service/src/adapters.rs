//! In-memory product store adapter.

use crate::ports::ProductStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::entities::{Product, ProductId};
use shared_types::ServiceError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory stand-in for the product service's relational store.
pub struct InMemoryProductStore {
    products: RwLock<HashMap<ProductId, Product>>,
    next_id: AtomicU64,
}

impl InMemoryProductStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            products: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Seed the store with fixed products (test and demo wiring).
    pub fn seed(&self, products: Vec<Product>) {
        let mut map = self.products.write();
        for product in products {
            self.next_id
                .fetch_max(product.id + 1, Ordering::SeqCst);
            map.insert(product.id, product);
        }
    }
}

impl Default for InMemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, mut product: Product) -> Result<Product, ServiceError> {
        product.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.products.write().insert(product.id, product.clone());
        Ok(product)
    }

    async fn get(&self, id: ProductId) -> Result<Product, ServiceError> {
        self.products
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("product {id}")))
    }

    async fn update(&self, product: &Product) -> Result<(), ServiceError> {
        let mut map = self.products.write();
        match map.get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(())
            }
            None => Err(ServiceError::NotFound(format!("product {}", product.id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn widget() -> Product {
        Product {
            id: 0,
            name: "widget".into(),
            description: "a widget".into(),
            price: dec!(50.0),
            stock: 10,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_identity() {
        let store = InMemoryProductStore::new();
        let a = store.insert(widget()).await.unwrap();
        let b = store.insert(widget()).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let store = InMemoryProductStore::new();
        assert!(matches!(
            store.get(99).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_persists() {
        let store = InMemoryProductStore::new();
        let mut product = store.insert(widget()).await.unwrap();
        product.stock = 8;
        store.update(&product).await.unwrap();

        assert_eq!(store.get(product.id).await.unwrap().stock, 8);
    }

    #[tokio::test]
    async fn test_seed_respects_existing_ids() {
        let store = InMemoryProductStore::new();
        let mut fixed = widget();
        fixed.id = 3;
        store.seed(vec![fixed]);

        let inserted = store.insert(widget()).await.unwrap();
        assert!(inserted.id > 3);
    }
}
