use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, ProductId};

/// Catalog product as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial product payload used for create (`POST`) and update (`PATCH`).
///
/// Unset fields are omitted from the request body so a `PATCH` only touches
/// what the caller changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ProductDraft {
    /// Client-side checks run before a create/update is sent.
    ///
    /// The server remains authoritative; this only catches obviously broken
    /// input early so the form can flag the field.
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name: must not be empty"));
            }
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err(DomainError::validation("price: must be a non-negative number"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_omits_unset_fields() {
        let draft = ProductDraft {
            price: Some(12.5),
            ..Default::default()
        };
        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body, serde_json::json!({ "price": 12.5 }));
    }

    #[test]
    fn draft_rejects_blank_name_and_negative_price() {
        let blank = ProductDraft {
            name: Some("  ".into()),
            ..Default::default()
        };
        assert!(blank.validate().is_err());

        let negative = ProductDraft {
            price: Some(-1.0),
            ..Default::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn product_decodes_api_shape() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "name": "Widget",
            "description": "A widget",
            "price": 1999.0,
            "category": "tools",
            "brand": "Acme",
            "images": [],
            "isActive": true,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(product.id.as_str(), "p1");
        assert!(product.is_active);
    }
}
