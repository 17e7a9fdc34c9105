//! `stockpanel-client`: session lifecycle, API access and route gating for
//! the StockPanel admin console.
//!
//! - [`SessionStore`] owns who is logged in and persists it across restarts.
//! - [`ApiClient`] is the only way to reach the REST API; it attaches the
//!   bearer token and tears the session down when the API answers 401.
//! - [`RouteGuard`] waits for the restored session, then gates each screen
//!   with the pure rules in `stockpanel-auth`.

pub mod app;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod navigator;
pub mod reads;
pub mod session;
pub mod storage;

pub use app::AppState;
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, FieldError};
pub use gateway::{ApiClient, Credentials, LoginResponse, UnauthorizedHandler};
pub use guard::{GuardState, RouteGuard};
pub use navigator::{History, Location, Navigator};
pub use session::{Hydration, SessionSnapshot, SessionStore};
pub use storage::{MemoryStorage, PersistedSession, SessionStorage, SqliteStorage, StorageError};
