//! Route guard: gates every screen on the session.
//!
//! The decision itself is the pure [`stockpanel_auth::evaluate`]; this module
//! adds the waiting. Nothing is decided while the persisted session is still
//! being restored, so a logged-in user is never bounced to login on startup.

use std::sync::Arc;

use serde::Serialize;
use stockpanel_auth::{GuardDecision, RouteTable, evaluate};
use tokio::sync::watch;

use crate::navigator::{Location, Navigator};
use crate::session::{Hydration, SessionSnapshot, SessionStore};

/// What a screen should render for a location right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GuardState {
    /// Session not restored yet; show a loading indicator, decide nothing.
    Hydrating,
    Resolved(GuardDecision),
}

impl GuardState {
    pub fn decision(&self) -> Option<&GuardDecision> {
        match self {
            GuardState::Hydrating => None,
            GuardState::Resolved(decision) => Some(decision),
        }
    }
}

pub struct RouteGuard {
    session: Arc<SessionStore>,
    table: RouteTable,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionStore>, table: RouteTable) -> Self {
        Self { session, table }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Non-blocking check for render paths.
    pub fn check(&self, location: &str) -> GuardState {
        if self.session.hydration() != Hydration::Ready {
            return GuardState::Hydrating;
        }
        GuardState::Resolved(evaluate(&self.table, location, self.session.role()))
    }

    /// Decide once the session is known.
    pub async fn resolve(&self, location: &str) -> GuardDecision {
        self.session.ready().await;
        evaluate(&self.table, location, self.session.role())
    }

    /// Resolve `location` and move the navigator accordingly: allowed
    /// locations are pushed, redirects replace the current entry and carry
    /// the origin along.
    pub async fn navigate(&self, navigator: &dyn Navigator, location: &str) -> GuardDecision {
        let decision = self.resolve(location).await;
        self.apply(navigator, location, &decision, false);
        decision
    }

    /// Like [`RouteGuard::navigate`], but an allowed location also replaces
    /// the current entry. Used to leave the login screen.
    pub async fn redirect(&self, navigator: &dyn Navigator, location: &str) -> GuardDecision {
        let decision = self.resolve(location).await;
        self.apply(navigator, location, &decision, true);
        decision
    }

    fn apply(&self, navigator: &dyn Navigator, location: &str, decision: &GuardDecision, replace: bool) {
        match decision.redirect() {
            None if replace => navigator.replace(Location::new(location)),
            None => navigator.push(Location::new(location)),
            Some(redirect) => {
                tracing::debug!(
                    requested = location,
                    to = %redirect.to,
                    decision = ?decision,
                    "route guard redirect"
                );
                navigator.replace(Location::with_origin(redirect.to.path(), redirect.from.clone()));
            }
        }
    }

    /// Session changes to re-run [`RouteGuard::check`] on. Losing the session
    /// mid-screen must take effect without waiting for the next navigation.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.session.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use stockpanel_auth::{Role, Route, User};
    use stockpanel_core::UserId;

    use super::*;
    use crate::config::ClientConfig;
    use crate::gateway::ApiClient;
    use crate::navigator::History;
    use crate::storage::{MemoryStorage, PersistedSession};

    fn session(role: Option<Role>) -> (Arc<SessionStore>, Arc<History>) {
        let persisted = match role {
            Some(role) => PersistedSession {
                token: Some("tok".into()),
                user: Some(User {
                    id: UserId::new("u1").unwrap(),
                    email: "user@example.com".into(),
                    first_name: "Sam".into(),
                    last_name: "Lee".into(),
                    role,
                    is_active: true,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                }),
            },
            None => PersistedSession::default(),
        };
        let gateway = Arc::new(ApiClient::new(&ClientConfig::new("http://127.0.0.1:9").unwrap()).unwrap());
        let history = Arc::new(History::new("/"));
        let store = SessionStore::new(
            Arc::new(MemoryStorage::with_session(persisted)),
            gateway,
            history.clone(),
        );
        (store, history)
    }

    #[tokio::test]
    async fn nothing_is_decided_before_hydration() {
        let (store, _) = session(Some(Role::Admin));
        let guard = RouteGuard::new(store.clone(), RouteTable::standard());

        assert_eq!(guard.check("/users"), GuardState::Hydrating);

        store.hydrate().await.unwrap();
        assert!(guard.check("/users").decision().is_some_and(GuardDecision::is_allowed));
    }

    #[tokio::test]
    async fn forbidden_redirects_to_dashboard() {
        let (store, history) = session(Some(Role::SecondaryInventor));
        store.hydrate().await.unwrap();
        let guard = RouteGuard::new(store, RouteTable::standard());

        let decision = guard.navigate(history.as_ref(), "/users").await;

        assert!(matches!(decision, GuardDecision::DeniedForbidden { .. }));
        assert_eq!(history.current().path, Route::Dashboard.path());
    }

    #[tokio::test]
    async fn unauthenticated_visit_keeps_origin() {
        let (store, history) = session(None);
        store.hydrate().await.unwrap();
        let guard = RouteGuard::new(store, RouteTable::standard());

        guard.navigate(history.as_ref(), "/orders").await;

        let current = history.current();
        assert_eq!(current.path, "/login");
        assert_eq!(current.from.as_deref(), Some("/orders"));
    }

    #[tokio::test]
    async fn allowed_locations_are_pushed() {
        let (store, history) = session(Some(Role::PrimaryInventor));
        store.hydrate().await.unwrap();
        let guard = RouteGuard::new(store, RouteTable::standard());

        guard.navigate(history.as_ref(), "/inventory").await;

        assert_eq!(history.len(), 2);
        assert_eq!(history.current().path, "/inventory");
    }

    #[tokio::test]
    async fn redirect_replaces_and_still_gates() {
        let (store, history) = session(Some(Role::SecondaryInventor));
        store.hydrate().await.unwrap();
        let guard = RouteGuard::new(store, RouteTable::standard());
        history.replace(Location::new("/login"));

        let decision = guard.redirect(history.as_ref(), "/users").await;
        assert!(matches!(decision, GuardDecision::DeniedForbidden { .. }));
        assert_eq!(history.current().path, "/dashboard");

        guard.redirect(history.as_ref(), "/orders").await;
        assert_eq!(history.len(), 1);
        assert_eq!(history.current().path, "/orders");
    }

    #[tokio::test]
    async fn logout_is_observed_through_watch() {
        let (store, _) = session(Some(Role::Admin));
        store.hydrate().await.unwrap();
        let guard = RouteGuard::new(store.clone(), RouteTable::standard());
        let mut changes = guard.watch();

        store.logout().await.unwrap();
        changes.changed().await.unwrap();

        assert!(matches!(
            guard.check("/products"),
            GuardState::Resolved(GuardDecision::DeniedUnauthenticated { .. })
        ));
    }
}
