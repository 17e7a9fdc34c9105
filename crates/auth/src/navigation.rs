//! Sidebar navigation entries and the role filter applied to them.

use serde::{Deserialize, Serialize};
use stockpanel_core::DomainError;

use crate::{Role, Route};

/// One sidebar link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEntry {
    /// Translation key of the link text.
    pub label: String,
    pub route: Route,
    /// Icon identifier understood by the rendering layer.
    pub icon: String,
    pub allowed_roles: Vec<Role>,
}

impl NavigationEntry {
    pub fn new(
        label: impl Into<String>,
        route: Route,
        icon: impl Into<String>,
        allowed_roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        Self {
            label: label.into(),
            route,
            icon: icon.into(),
            allowed_roles: allowed_roles.into_iter().collect(),
        }
    }

    pub fn visible_to(&self, role: Role) -> bool {
        self.allowed_roles.contains(&role)
    }

    /// Highlight rule for the active link: exact path match.
    pub fn is_active(&self, current_path: &str) -> bool {
        let path = current_path.split(['?', '#']).next().unwrap_or_default();
        path.trim_end_matches('/') == self.route.path()
    }
}

/// What the filter returns when nothing is visible (no user, or a role with
/// no entries).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavFallback {
    /// Render an empty menu.
    #[default]
    Empty,
    /// Show every entry unfiltered, as the first console releases did.
    FullList,
}

impl core::str::FromStr for NavFallback {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empty" => Ok(NavFallback::Empty),
            "full" | "full_list" => Ok(NavFallback::FullList),
            other => Err(DomainError::unknown_variant("navigation fallback", other)),
        }
    }
}

/// The seven sidebar entries, in display order.
pub fn standard_entries() -> Vec<NavigationEntry> {
    use Role::*;
    vec![
        NavigationEntry::new(
            "navigation.dashboard",
            Route::Dashboard,
            "layout-dashboard",
            [Admin, PrimaryInventor, SecondaryInventor],
        ),
        NavigationEntry::new("navigation.products", Route::Products, "package", [Admin, PrimaryInventor]),
        NavigationEntry::new(
            "navigation.orders",
            Route::Orders,
            "shopping-cart",
            [Admin, PrimaryInventor, SecondaryInventor],
        ),
        NavigationEntry::new(
            "navigation.inventory",
            Route::Inventory,
            "archive",
            [Admin, PrimaryInventor, SecondaryInventor],
        ),
        NavigationEntry::new("navigation.returns", Route::Returns, "rotate-ccw", [Admin, PrimaryInventor]),
        NavigationEntry::new("navigation.users", Route::Users, "users", [Admin]),
        NavigationEntry::new(
            "navigation.settings",
            Route::Settings,
            "settings",
            [Admin, PrimaryInventor, SecondaryInventor],
        ),
    ]
}

/// Keep the entries visible to `role`, preserving order.
pub fn filter_navigation<'a>(
    entries: &'a [NavigationEntry],
    role: Option<Role>,
    fallback: NavFallback,
) -> Vec<&'a NavigationEntry> {
    let visible: Vec<&NavigationEntry> = match role {
        Some(role) => entries.iter().filter(|entry| entry.visible_to(role)).collect(),
        None => Vec::new(),
    };

    if visible.is_empty() && fallback == NavFallback::FullList {
        return entries.iter().collect();
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes(entries: &[&NavigationEntry]) -> Vec<Route> {
        entries.iter().map(|entry| entry.route).collect()
    }

    #[test]
    fn admin_sees_everything_in_order() {
        let entries = standard_entries();
        let visible = filter_navigation(&entries, Some(Role::Admin), NavFallback::Empty);
        assert_eq!(visible.len(), 7);
        assert_eq!(
            routes(&visible),
            entries.iter().map(|entry| entry.route).collect::<Vec<_>>()
        );
    }

    #[test]
    fn secondary_inventor_sees_subset() {
        let entries = standard_entries();
        let visible = filter_navigation(&entries, Some(Role::SecondaryInventor), NavFallback::Empty);
        assert_eq!(
            routes(&visible),
            vec![Route::Dashboard, Route::Orders, Route::Inventory, Route::Settings]
        );
    }

    #[test]
    fn primary_inventor_loses_only_users() {
        let entries = standard_entries();
        let visible = filter_navigation(&entries, Some(Role::PrimaryInventor), NavFallback::Empty);
        assert_eq!(visible.len(), 6);
        assert!(!routes(&visible).contains(&Route::Users));
    }

    #[test]
    fn no_role_follows_fallback_policy() {
        let entries = standard_entries();
        assert!(filter_navigation(&entries, None, NavFallback::Empty).is_empty());
        assert_eq!(filter_navigation(&entries, None, NavFallback::FullList).len(), 7);
    }

    #[test]
    fn empty_result_follows_fallback_policy() {
        let entries = vec![NavigationEntry::new("x", Route::Users, "users", [Role::Admin])];
        let role = Some(Role::SecondaryInventor);
        assert!(filter_navigation(&entries, role, NavFallback::Empty).is_empty());
        assert_eq!(filter_navigation(&entries, role, NavFallback::FullList).len(), 1);
    }

    #[test]
    fn active_entry_is_exact_path_match() {
        let entries = standard_entries();
        let orders = &entries[2];
        assert!(orders.is_active("/orders"));
        assert!(orders.is_active("/orders/?page=1"));
        assert!(!orders.is_active("/orders/42"));
        assert!(!orders.is_active("/dashboard"));
    }

    #[test]
    fn entries_agree_with_route_table() {
        let table = crate::RouteTable::standard();
        for entry in standard_entries() {
            let rule = table.rule(entry.route).unwrap();
            for role in Role::ALL {
                assert_eq!(entry.visible_to(role), rule.permits(role), "{:?} {role}", entry.route);
            }
        }
    }

    #[test]
    fn fallback_parses_from_config_strings() {
        assert_eq!("full".parse::<NavFallback>().unwrap(), NavFallback::FullList);
        assert_eq!("EMPTY".parse::<NavFallback>().unwrap(), NavFallback::Empty);
        assert!("sometimes".parse::<NavFallback>().is_err());
    }
}
