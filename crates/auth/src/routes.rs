//! Declarative route table: every screen carries its allowed-role set as data.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use stockpanel_core::DomainError;

use crate::Role;

/// Screens of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Login,
    Dashboard,
    Products,
    Orders,
    Inventory,
    Returns,
    Users,
    Settings,
}

impl Route {
    pub const ALL: [Route; 8] = [
        Route::Login,
        Route::Dashboard,
        Route::Products,
        Route::Orders,
        Route::Inventory,
        Route::Returns,
        Route::Users,
        Route::Settings,
    ];

    /// Landing page for authenticated users and target of forbidden redirects.
    pub const DEFAULT: Route = Route::Dashboard;

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Products => "/products",
            Route::Orders => "/orders",
            Route::Inventory => "/inventory",
            Route::Returns => "/returns",
            Route::Users => "/users",
            Route::Settings => "/settings",
        }
    }

    /// Resolve a location to the screen that owns it.
    ///
    /// Query strings and fragments are ignored and nested paths belong to
    /// their first segment (`/orders/42` is gated as `/orders`).
    pub fn from_path(location: &str) -> Option<Route> {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let segment = path.trim_start_matches('/').split('/').next()?;
        Route::ALL
            .into_iter()
            .find(|route| route.path().trim_start_matches('/') == segment)
    }
}

impl core::fmt::Display for Route {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.path())
    }
}

/// Who may view a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteAccessRule {
    pub route: Route,
    /// `false` only for the login screen.
    pub requires_authentication: bool,
    /// Empty means any authenticated role.
    pub allowed_roles: BTreeSet<Role>,
}

impl RouteAccessRule {
    pub fn public(route: Route) -> Self {
        Self {
            route,
            requires_authentication: false,
            allowed_roles: BTreeSet::new(),
        }
    }

    pub fn authenticated(route: Route) -> Self {
        Self {
            route,
            requires_authentication: true,
            allowed_roles: BTreeSet::new(),
        }
    }

    pub fn restricted(route: Route, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            route,
            requires_authentication: true,
            allowed_roles: roles.into_iter().collect(),
        }
    }

    /// Role check only; authentication is decided by the caller.
    pub fn permits(&self, role: Role) -> bool {
        self.allowed_roles.is_empty() || self.allowed_roles.contains(&role)
    }
}

/// Immutable set of access rules, one per route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    rules: Vec<RouteAccessRule>,
}

impl RouteTable {
    /// Build a table from explicit rules. Each route may be declared once.
    pub fn new(rules: Vec<RouteAccessRule>) -> Result<Self, DomainError> {
        let mut seen = BTreeSet::new();
        for rule in &rules {
            if !seen.insert(rule.route.path()) {
                return Err(DomainError::validation(format!(
                    "route {} declared twice",
                    rule.route
                )));
            }
        }
        Ok(Self { rules })
    }

    /// The console's route surface.
    pub fn standard() -> Self {
        Self {
            rules: vec![
                RouteAccessRule::public(Route::Login),
                RouteAccessRule::authenticated(Route::Dashboard),
                RouteAccessRule::restricted(Route::Products, [Role::Admin, Role::PrimaryInventor]),
                RouteAccessRule::authenticated(Route::Orders),
                RouteAccessRule::authenticated(Route::Inventory),
                RouteAccessRule::restricted(Route::Returns, [Role::Admin, Role::PrimaryInventor]),
                RouteAccessRule::restricted(Route::Users, [Role::Admin]),
                RouteAccessRule::authenticated(Route::Settings),
            ],
        }
    }

    pub fn rule(&self, route: Route) -> Option<&RouteAccessRule> {
        self.rules.iter().find(|rule| rule.route == route)
    }

    pub fn rules(&self) -> &[RouteAccessRule] {
        &self.rules
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}
