//! Typed resource calls on [`ApiClient`].
//!
//! Drafts are validated locally first so obviously bad input never costs a
//! round trip; the server still has the final say.

use std::borrow::Cow;

use serde::Serialize;
use stockpanel_auth::{User, UserDraft};
use stockpanel_core::{
    DashboardStats, DomainError, InventoryRecord, ListPage, Order, OrderDraft, OrderId,
    OrderQuery, OrderStatus, Product, ProductDraft, ProductId, ProductQuery, ReturnDraft, ReturnId,
    ReturnRequest, ReturnStatus, StockUpdate, UserId,
};

use crate::error::ClientError;
use crate::gateway::ApiClient;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangePassword<'a> {
    old_password: &'a str,
    new_password: &'a str,
}

#[derive(Serialize)]
struct StatusChange<S> {
    status: S,
}

/// Percent-encode an id so it always addresses exactly one path segment.
fn segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

impl ApiClient {
    // ── auth ────────────────────────────────────────────────────────────────

    pub async fn change_password(&self, old: &str, new: &str) -> Result<(), ClientError> {
        if old.is_empty() {
            return Err(DomainError::validation("oldPassword: required").into());
        }
        if new.len() < 6 {
            return Err(DomainError::validation("newPassword: must be at least 6 characters").into());
        }
        self.post_unit(
            "/auth/change-password",
            &ChangePassword {
                old_password: old,
                new_password: new,
            },
        )
        .await
    }

    // ── dashboard ───────────────────────────────────────────────────────────

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ClientError> {
        self.get("/dashboard/stats").await
    }

    // ── users (admin) ───────────────────────────────────────────────────────

    pub async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.get("/users").await
    }

    pub async fn get_user(&self, id: &UserId) -> Result<User, ClientError> {
        self.get(&format!("/users/{}", segment(id.as_str()))).await
    }

    pub async fn create_user(&self, draft: &UserDraft) -> Result<User, ClientError> {
        if draft.email.is_none() {
            return Err(DomainError::validation("email: required").into());
        }
        if draft.password.is_none() {
            return Err(DomainError::validation("password: required").into());
        }
        draft.validate()?;
        self.post("/users", draft).await
    }

    pub async fn update_user(&self, id: &UserId, draft: &UserDraft) -> Result<User, ClientError> {
        draft.validate()?;
        self.patch(&format!("/users/{}", segment(id.as_str())), draft).await
    }

    pub async fn delete_user(&self, id: &UserId) -> Result<(), ClientError> {
        self.delete(&format!("/users/{}", segment(id.as_str()))).await
    }

    // ── products ────────────────────────────────────────────────────────────

    pub async fn list_products(&self, query: &ProductQuery) -> Result<ListPage<Product>, ClientError> {
        self.get_with_query("/products", query).await
    }

    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ClientError> {
        self.get(&format!("/products/{}", segment(id.as_str()))).await
    }

    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product, ClientError> {
        if draft.name.is_none() {
            return Err(DomainError::validation("name: required").into());
        }
        draft.validate()?;
        self.post("/products", draft).await
    }

    pub async fn update_product(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, ClientError> {
        draft.validate()?;
        self.patch(&format!("/products/{}", segment(id.as_str())), draft).await
    }

    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ClientError> {
        self.delete(&format!("/products/{}", segment(id.as_str()))).await
    }

    // ── orders ──────────────────────────────────────────────────────────────

    pub async fn list_orders(&self, query: &OrderQuery) -> Result<ListPage<Order>, ClientError> {
        self.get_with_query("/orders", query).await
    }

    pub async fn get_order(&self, id: &OrderId) -> Result<Order, ClientError> {
        self.get(&format!("/orders/{}", segment(id.as_str()))).await
    }

    pub async fn create_order(&self, draft: &OrderDraft) -> Result<Order, ClientError> {
        draft.validate()?;
        self.post("/orders", draft).await
    }

    pub async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, ClientError> {
        self.patch(&format!("/orders/{}/status", segment(id.as_str())), &StatusChange { status })
            .await
    }

    // ── inventory ───────────────────────────────────────────────────────────

    pub async fn list_inventory(&self) -> Result<Vec<InventoryRecord>, ClientError> {
        self.get("/inventory").await
    }

    pub async fn get_product_inventory(
        &self,
        product_id: &ProductId,
    ) -> Result<InventoryRecord, ClientError> {
        self.get(&format!("/inventory/{}", segment(product_id.as_str()))).await
    }

    pub async fn update_stock(
        &self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<InventoryRecord, ClientError> {
        let update = StockUpdate::new(quantity)?;
        self.patch(&format!("/inventory/{}", segment(product_id.as_str())), &update).await
    }

    // ── returns ─────────────────────────────────────────────────────────────

    pub async fn list_returns(&self) -> Result<Vec<ReturnRequest>, ClientError> {
        self.get("/returns").await
    }

    pub async fn get_return(&self, id: &ReturnId) -> Result<ReturnRequest, ClientError> {
        self.get(&format!("/returns/{}", segment(id.as_str()))).await
    }

    pub async fn create_return(&self, draft: &ReturnDraft) -> Result<ReturnRequest, ClientError> {
        draft.validate()?;
        self.post("/returns", draft).await
    }

    pub async fn update_return_status(
        &self,
        id: &ReturnId,
        status: ReturnStatus,
    ) -> Result<ReturnRequest, ClientError> {
        self.patch(&format!("/returns/{}/status", segment(id.as_str())), &StatusChange { status })
            .await
    }
}
