use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, InventoryId, Product, ProductId};

/// Stock level of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub id: InventoryId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub min_threshold: i64,
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_low_stock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

impl InventoryRecord {
    /// Low-stock flag, falling back to the threshold when the API omits it.
    pub fn low_stock(&self) -> bool {
        self.is_low_stock
            .unwrap_or(self.quantity <= self.min_threshold)
    }
}

/// Payload for `PATCH /inventory/{productId}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdate {
    pub quantity: i64,
}

impl StockUpdate {
    pub fn new(quantity: i64) -> Result<Self, DomainError> {
        if quantity < 0 {
            return Err(DomainError::validation("quantity: must not be negative"));
        }
        Ok(Self { quantity })
    }
}
