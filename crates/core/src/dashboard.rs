use serde::{Deserialize, Serialize};

use crate::Order;

/// One point of the sales trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesPoint {
    pub date: String,
    pub amount: f64,
}

/// Aggregates behind the dashboard cards.
///
/// `Default` is the zeroed dataset rendered when the stats endpoint fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub low_stock_items: u64,
    pub pending_returns: u64,
    #[serde(default)]
    pub recent_orders: Vec<Order>,
    #[serde(default)]
    pub sales_trend: Vec<SalesPoint>,
}

impl DashboardStats {
    pub fn is_empty(&self) -> bool {
        self.total_orders == 0 && self.recent_orders.is_empty() && self.sales_trend.is_empty()
    }
}
