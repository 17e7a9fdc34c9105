//! `stockpanel-auth`: pure role-based access control for the console.
//!
//! This crate is intentionally decoupled from HTTP and storage. It answers two
//! questions from data alone: may this session open a route, and which sidebar
//! entries should it see. The server stays the real enforcement point.

pub mod authorize;
pub mod navigation;
pub mod roles;
pub mod routes;
pub mod user;

pub use authorize::{
    Access, AccessExplanation, GuardDecision, Redirect, authorize, evaluate, explain_access,
    post_login_target,
};
pub use navigation::{NavFallback, NavigationEntry, filter_navigation, standard_entries};
pub use roles::Role;
pub use routes::{Route, RouteAccessRule, RouteTable};
pub use user::{User, UserDraft, validate_email};
