//! Read helpers for screens that would rather render empty than fail.
//!
//! Every error is logged and swallowed. A 401 has already torn the session
//! down inside the gateway before the default comes back, so nothing is lost
//! by not propagating it.

use stockpanel_auth::User;
use stockpanel_core::{
    DashboardStats, InventoryRecord, ListPage, Order, OrderQuery, Product, ProductQuery,
    ReturnRequest,
};

use crate::error::ClientError;
use crate::gateway::ApiClient;

fn or_default<T: Default>(what: &'static str, result: Result<T, ClientError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(resource = what, error = %err, "read failed; showing defaults");
            T::default()
        }
    }
}

pub async fn dashboard_stats_or_default(api: &ApiClient) -> DashboardStats {
    or_default("dashboard_stats", api.dashboard_stats().await)
}

pub async fn products_or_empty(api: &ApiClient, query: &ProductQuery) -> ListPage<Product> {
    or_default("products", api.list_products(query).await)
}

pub async fn orders_or_empty(api: &ApiClient, query: &OrderQuery) -> ListPage<Order> {
    or_default("orders", api.list_orders(query).await)
}

/// A payload that is not an array fails to decode and lands here as empty.
pub async fn inventory_or_empty(api: &ApiClient) -> Vec<InventoryRecord> {
    or_default("inventory", api.list_inventory().await)
}

pub async fn returns_or_empty(api: &ApiClient) -> Vec<ReturnRequest> {
    or_default("returns", api.list_returns().await)
}

pub async fn users_or_empty(api: &ApiClient) -> Vec<User> {
    or_default("users", api.list_users().await)
}
