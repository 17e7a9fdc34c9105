use serde::{Deserialize, Serialize};

use crate::{OrderStatus, UserId};

/// Paginated list envelope: `{ data: T[], total }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub data: Vec<T>,
    pub total: u64,
}

impl<T> Default for ListPage<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            total: 0,
        }
    }
}

impl<T> ListPage<T> {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Query string for `GET /products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Query string for `GET /orders`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_serializes_to_nothing() {
        let value = serde_json::to_value(ProductQuery::default()).unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[test]
    fn order_query_uses_wire_names() {
        let query = OrderQuery {
            page: Some(2),
            status: Some(OrderStatus::Pending),
            ..Default::default()
        };
        let value = serde_json::to_value(query).unwrap();
        assert_eq!(value, serde_json::json!({ "page": 2, "status": "PENDING" }));
    }
}
