//! Service container with explicit dependency injection.
//!
//! Construction order follows the dependency graph: shared
//! infrastructure first, then products, then the order coordinator,
//! then the payment reconciler (which calls back into the coordinator
//! through the local RPC adapter). No globals anywhere.

use crate::clients::{LocalOrderStatusClient, LocalProductClient};
use crate::config::RuntimeConfig;
use admission_gate::{AdmissionGate, InMemoryBucketStore};
use cache_layer::{CacheLayer, InMemoryCacheStore};
use order_service::{InMemoryOrderStore, OrderCoordinator};
use payment_service::{InMemoryPaymentStore, PaymentReconciler, StubCheckoutGateway};
use product_service::{InMemoryProductStore, ProductService};
use shared_bus::InMemoryEventBus;
use std::sync::Arc;
use tracing::info;

/// All wired services for a single-process deployment.
pub struct ServiceContainer {
    pub bus: Arc<InMemoryEventBus>,
    pub gate: AdmissionGate,
    pub products: Arc<ProductService>,
    pub orders: Arc<OrderCoordinator>,
    pub payments: Arc<PaymentReconciler>,
    /// Kept for seeding and inspection; services only see the trait.
    pub product_store: Arc<InMemoryProductStore>,
    pub payment_store: Arc<InMemoryPaymentStore>,
    pub checkout_gateway: Arc<StubCheckoutGateway>,
}

impl ServiceContainer {
    #[must_use]
    pub fn new(config: &RuntimeConfig) -> Self {
        info!("Wiring commerce services");

        // Shared infrastructure
        let bus = Arc::new(InMemoryEventBus::with_capacity(config.bus_capacity));
        let cache_store = Arc::new(InMemoryCacheStore::new());
        let cache = CacheLayer::new(cache_store);
        let gate = AdmissionGate::with_profile(
            Arc::new(InMemoryBucketStore::new()),
            config.gate_profile,
        )
        .fail_open(config.gate_fail_open);

        // Product service
        let product_store = Arc::new(InMemoryProductStore::new());
        let products = Arc::new(ProductService::new(product_store.clone(), cache.clone()));

        // Order coordinator
        let orders = Arc::new(OrderCoordinator::new(
            Arc::new(InMemoryOrderStore::new()),
            Arc::new(LocalProductClient::new(products.clone())),
            bus.clone(),
            cache.clone(),
        ));

        // Payment reconciler
        let payment_store = Arc::new(InMemoryPaymentStore::new());
        let checkout_gateway = Arc::new(StubCheckoutGateway::new());
        let payments = Arc::new(PaymentReconciler::new(
            payment_store.clone(),
            checkout_gateway.clone(),
            Arc::new(LocalOrderStatusClient::new(orders.clone())),
            cache,
            config.server_key.clone(),
        ));

        Self {
            bus,
            gate,
            products,
            orders,
            payments,
            product_store,
            payment_store,
            checkout_gateway,
        }
    }
}
