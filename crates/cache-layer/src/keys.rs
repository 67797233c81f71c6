//! Cache key scheme.
//!
//! Keys are namespaced per entity and per list page:
//!
//! - `order:<orderId>`
//! - `orders:user<userId>page<page>`
//! - `payment:order<orderId>`
//! - `product:<id>`
//! - `products:list:page:<page>`
//!
//! Prefix builders exist for every pattern-invalidation sweep a mutation
//! needs.

/// Key for a single order.
#[must_use]
pub fn order(order_id: u64) -> String {
    format!("order:{order_id}")
}

/// Key for one page of a user's order list.
#[must_use]
pub fn user_orders_page(user_id: u64, page: u64) -> String {
    format!("orders:user{user_id}page{page}")
}

/// Prefix matching every list page of one user.
#[must_use]
pub fn user_orders_prefix(user_id: u64) -> String {
    format!("orders:user{user_id}page")
}

/// Prefix matching every user's list pages. Used when the mutation does
/// not carry the owning user (order status propagation).
#[must_use]
pub fn all_user_orders_prefix() -> &'static str {
    "orders:user"
}

/// Key for the payment attached to an order.
#[must_use]
pub fn payment_by_order(order_id: u64) -> String {
    format!("payment:order{order_id}")
}

/// Key for a single product.
#[must_use]
pub fn product(product_id: u64) -> String {
    format!("product:{product_id}")
}

/// Key for one page of the product list.
#[must_use]
pub fn products_list_page(page: u64) -> String {
    format!("products:list:page:{page}")
}

/// Prefix matching every product-list page.
#[must_use]
pub fn products_list_prefix() -> &'static str {
    "products:list:"
}
