//! Application state: one instance of every core component, wired together.

use std::sync::Arc;

use stockpanel_auth::{
    GuardDecision, NavigationEntry, RouteTable, User, filter_navigation, post_login_target,
    standard_entries,
};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::gateway::ApiClient;
use crate::guard::RouteGuard;
use crate::navigator::{History, Navigator};
use crate::session::SessionStore;
use crate::storage::{SessionStorage, SqliteStorage};

/// Shared handles for whatever renders the console.
#[derive(Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub api: Arc<ApiClient>,
    pub session: Arc<SessionStore>,
    pub guard: Arc<RouteGuard>,
    pub history: Arc<History>,
    navigation: Arc<Vec<NavigationEntry>>,
}

impl AppState {
    /// Wire the components over `storage`. The session is not hydrated yet.
    pub fn new(config: ClientConfig, storage: Arc<dyn SessionStorage>) -> Result<Self, ClientError> {
        let api = Arc::new(ApiClient::new(&config)?);
        let history = Arc::new(History::default());
        let session = SessionStore::new(storage, api.clone(), history.clone());
        let guard = Arc::new(RouteGuard::new(session.clone(), RouteTable::standard()));

        Ok(Self {
            config,
            api,
            session,
            guard,
            history,
            navigation: Arc::new(standard_entries()),
        })
    }

    /// Open the on-disk session store and restore the previous session.
    pub async fn open(config: ClientConfig) -> anyhow::Result<Self> {
        let path = config.state_db_path()?;
        tracing::info!(path = %path.display(), api_url = %config.api_url, "opening session store");

        let storage = Arc::new(SqliteStorage::open(&path).await?);
        let state = Self::new(config, storage)?;
        if let Err(err) = state.session.hydrate().await {
            // Hydration still completes (logged out), so the console stays usable.
            tracing::warn!(error = %err, "could not restore previous session");
        }
        Ok(state)
    }

    /// Sidebar entries for the current session, in display order.
    pub fn visible_navigation(&self) -> Vec<&NavigationEntry> {
        filter_navigation(
            &self.navigation,
            self.session.role(),
            self.config.nav_fallback,
        )
    }

    /// Navigate through the route guard.
    pub async fn open_location(&self, location: &str) -> GuardDecision {
        self.guard.navigate(self.history.as_ref(), location).await
    }

    /// Log in, then return to the location that sent the user to login.
    ///
    /// The return trip goes through the guard like any other navigation, so
    /// a role that may not open the origin lands on the dashboard instead.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let user = self.session.login(email, password).await?;
        let origin = self.history.current().from;
        let target = post_login_target(origin.as_deref());
        self.guard.redirect(self.history.as_ref(), &target).await;
        Ok(user)
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.session.logout().await
    }
}
