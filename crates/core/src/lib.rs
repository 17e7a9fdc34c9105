//! `stockpanel-core`: shared data shapes of the StockPanel admin console.
//!
//! Everything here mirrors the REST API's wire format (camelCase JSON). The
//! crate has no IO; the client crate owns transport and persistence.

pub mod dashboard;
pub mod error;
pub mod id;
pub mod inventory;
pub mod order;
pub mod page;
pub mod product;
pub mod returns;

pub use dashboard::{DashboardStats, SalesPoint};
pub use error::{DomainError, DomainResult};
pub use id::{InventoryId, OrderId, OrderItemId, ProductId, ReturnId, UserId};
pub use inventory::{InventoryRecord, StockUpdate};
pub use order::{Order, OrderDraft, OrderItem, OrderLineDraft, OrderStatus};
pub use page::{ListPage, OrderQuery, ProductQuery};
pub use product::{Product, ProductDraft};
pub use returns::{ReturnDraft, ReturnRequest, ReturnStatus};
