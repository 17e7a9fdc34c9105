use serde::Serialize;

use crate::{Role, Route, RouteAccessRule, RouteTable};

/// Outcome of checking one route rule against the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Allowed,
    /// No authenticated session; send the visitor to login.
    DeniedUnauthenticated,
    /// Valid session, insufficient role; send the user to the default page.
    DeniedForbidden,
}

/// Authorize the current session for a route.
///
/// `role` is `Some` only when the session is authenticated (user and token
/// both held). A role-less session never reaches the role check, so an
/// unauthenticated visitor is never reported as forbidden.
///
/// - No IO
/// - No panics
pub fn authorize(role: Option<Role>, rule: &RouteAccessRule) -> Access {
    if !rule.requires_authentication {
        return Access::Allowed;
    }
    match role {
        None => Access::DeniedUnauthenticated,
        Some(role) if rule.permits(role) => Access::Allowed,
        Some(_) => Access::DeniedForbidden,
    }
}

/// Where a redirect sends the user, and what they originally asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub to: Route,
    /// Originally requested location, threaded through login so it can
    /// return there. Never persisted.
    pub from: Option<String>,
}

/// Decision for one navigation attempt once the session is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    Allowed { route: Route },
    DeniedUnauthenticated { redirect: Redirect },
    DeniedForbidden { redirect: Redirect },
    /// Plain redirect that is not a denial (`/`, `/login` while logged in,
    /// unknown paths for an authenticated user).
    Redirected { redirect: Redirect },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allowed { .. })
    }

    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            GuardDecision::Allowed { .. } => None,
            GuardDecision::DeniedUnauthenticated { redirect }
            | GuardDecision::DeniedForbidden { redirect }
            | GuardDecision::Redirected { redirect } => Some(redirect),
        }
    }
}

/// Evaluate a requested location against the route table.
pub fn evaluate(table: &RouteTable, location: &str, role: Option<Role>) -> GuardDecision {
    let rule = Route::from_path(location).and_then(|route| table.rule(route));

    let Some(rule) = rule else {
        // `/` and unknown paths: land on the dashboard, going through login first.
        return match role {
            Some(_) => GuardDecision::Redirected {
                redirect: Redirect {
                    to: Route::DEFAULT,
                    from: None,
                },
            },
            None => GuardDecision::DeniedUnauthenticated {
                redirect: Redirect {
                    to: Route::Login,
                    from: origin(location),
                },
            },
        };
    };

    if rule.route == Route::Login && role.is_some() {
        return GuardDecision::Redirected {
            redirect: Redirect {
                to: Route::DEFAULT,
                from: None,
            },
        };
    }

    match authorize(role, rule) {
        Access::Allowed => GuardDecision::Allowed { route: rule.route },
        Access::DeniedUnauthenticated => GuardDecision::DeniedUnauthenticated {
            redirect: Redirect {
                to: Route::Login,
                from: Some(location.to_string()),
            },
        },
        Access::DeniedForbidden => GuardDecision::DeniedForbidden {
            redirect: Redirect {
                to: Route::DEFAULT,
                from: None,
            },
        },
    }
}

/// Location to open after a successful login.
pub fn post_login_target(from: Option<&str>) -> String {
    match from {
        Some(from) if Route::from_path(from).is_some_and(|route| route != Route::Login) => {
            from.to_string()
        }
        _ => Route::DEFAULT.path().to_string(),
    }
}

fn origin(location: &str) -> Option<String> {
    let trimmed = location.trim();
    if trimmed.is_empty() || trimmed == "/" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Access Explanation
// ─────────────────────────────────────────────────────────────────────────────

/// Human-readable account of an access decision, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct AccessExplanation {
    pub route: Route,
    pub access: Access,
    pub role: Option<Role>,
    pub allowed_roles: Vec<Role>,
    pub reason: String,
}

/// Explain why `authorize` returns what it does for this rule.
pub fn explain_access(role: Option<Role>, rule: &RouteAccessRule) -> AccessExplanation {
    let access = authorize(role, rule);
    let allowed_roles: Vec<Role> = rule.allowed_roles.iter().copied().collect();

    let reason = match (access, role) {
        (Access::Allowed, _) if !rule.requires_authentication => {
            format!("{} is public", rule.route)
        }
        (Access::Allowed, Some(role)) if allowed_roles.is_empty() => {
            format!("{} is open to any authenticated role; {role} is signed in", rule.route)
        }
        (Access::Allowed, Some(role)) => format!("{role} is listed for {}", rule.route),
        (Access::DeniedUnauthenticated, _) => {
            format!("{} requires an authenticated session", rule.route)
        }
        (Access::DeniedForbidden, Some(role)) => format!(
            "{role} is not in the allowed roles {:?} for {}",
            allowed_roles.iter().map(Role::as_str).collect::<Vec<_>>(),
            rule.route
        ),
        (access, None) => format!("{access:?} without a session for {}", rule.route),
    };

    AccessExplanation {
        route: rule.route,
        access,
        role,
        allowed_roles,
        reason,
    }
}
