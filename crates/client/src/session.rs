//! Session store: the single source of truth for who is logged in.
//!
//! `login`, `logout` and `set_user` are the only mutation surface (plus the
//! startup hydration that restores what a previous run persisted). Mutations
//! are serialized and write durable storage before memory, so once a call
//! returns both agree.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::Serialize;
use stockpanel_auth::{Role, Route, User};
use tokio::sync::{Mutex, watch};

use crate::error::ClientError;
use crate::gateway::{ApiClient, Credentials, UnauthorizedHandler};
use crate::navigator::{Location, Navigator};
use crate::storage::{PersistedSession, SessionStorage, StorageError};

/// Point-in-time view of the session.
///
/// Authentication is derived, never stored: a session is authenticated only
/// when both user and token are held.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    #[serde(skip)]
    pub token: Option<String>,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    /// Role of an authenticated session; `None` otherwise.
    pub fn role(&self) -> Option<Role> {
        if self.is_authenticated() {
            self.user.as_ref().map(|user| user.role)
        } else {
            None
        }
    }

    fn from_persisted(persisted: PersistedSession) -> Self {
        Self {
            user: persisted.user,
            token: persisted.token,
        }
    }

    fn to_persisted(&self) -> PersistedSession {
        PersistedSession {
            token: self.token.clone(),
            user: self.user.clone(),
        }
    }
}

/// Progress of restoring the persisted session at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Hydration {
    Uninitialized,
    Loading,
    Ready,
}

pub struct SessionStore {
    state: watch::Sender<SessionSnapshot>,
    hydration: watch::Sender<Hydration>,
    /// Serializes mutations, storage IO included.
    writer: Mutex<()>,
    login_in_flight: AtomicBool,
    storage: Arc<dyn SessionStorage>,
    gateway: Arc<ApiClient>,
    navigator: Arc<dyn Navigator>,
}

impl SessionStore {
    /// Create an empty, not yet hydrated store and register it as the
    /// gateway's 401 handler.
    pub fn new(
        storage: Arc<dyn SessionStorage>,
        gateway: Arc<ApiClient>,
        navigator: Arc<dyn Navigator>,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(SessionSnapshot::default());
        let (hydration, _) = watch::channel(Hydration::Uninitialized);

        let store = Arc::new(Self {
            state,
            hydration,
            writer: Mutex::new(()),
            login_in_flight: AtomicBool::new(false),
            storage,
            gateway,
            navigator,
        });

        let weak = Arc::downgrade(&store);
        let handler: std::sync::Weak<dyn UnauthorizedHandler> = weak;
        store.gateway.set_unauthorized_handler(handler);
        store
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn role(&self) -> Option<Role> {
        self.state.borrow().role()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Receiver that wakes on every session mutation.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn hydration(&self) -> Hydration {
        *self.hydration.borrow()
    }

    /// Wait until the persisted session has been restored (or replaced by a
    /// mutation).
    pub async fn ready(&self) {
        let mut rx = self.hydration.subscribe();
        // The sender lives as long as `self`, so this only errs on teardown.
        let _ = rx.wait_for(|h| *h == Hydration::Ready).await;
    }

    /// Restore the persisted session.
    ///
    /// Runs once; later calls wait for the first to finish. A half-populated
    /// or corrupt record is discarded and the store starts logged out. The
    /// store is `Ready` afterwards even when the read fails, so routing never
    /// stalls on broken storage.
    pub async fn hydrate(&self) -> Result<(), ClientError> {
        let started = self.hydration.send_if_modified(|h| {
            if *h == Hydration::Uninitialized {
                *h = Hydration::Loading;
                true
            } else {
                false
            }
        });
        if !started {
            self.ready().await;
            return Ok(());
        }

        let _writer = self.writer.lock().await;
        let result = self.load_persisted().await;
        self.mark_ready();
        result
    }

    async fn load_persisted(&self) -> Result<(), ClientError> {
        let persisted = match self.storage.load().await {
            Ok(persisted) => persisted,
            Err(StorageError::Corrupt(reason)) => {
                tracing::warn!(%reason, "discarding corrupt persisted session");
                self.storage.clear().await?;
                return Ok(());
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to read persisted session");
                return Err(err.into());
            }
        };

        let restored = SessionSnapshot::from_persisted(persisted);
        if restored.is_authenticated() {
            tracing::info!(
                user_id = %restored.user.as_ref().map(|u| u.id.to_string()).unwrap_or_default(),
                role = ?restored.role(),
                "session restored"
            );
            self.gateway.set_token(restored.token.clone());
            self.state.send_replace(restored);
        } else if restored != SessionSnapshot::default() {
            tracing::warn!("discarding half-populated persisted session");
            self.storage.clear().await?;
        }
        Ok(())
    }

    /// Log in with email and password.
    ///
    /// On failure nothing changes: an existing session stays as it was.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let credentials = Credentials::new(email, password)?;

        if self.login_in_flight.swap(true, Ordering::AcqRel) {
            return Err(ClientError::LoginInFlight);
        }
        let _in_flight = InFlight(&self.login_in_flight);

        let response = self.gateway.authenticate(&credentials).await?;

        let _writer = self.writer.lock().await;
        let next = SessionSnapshot {
            user: Some(response.user),
            token: Some(response.access_token),
        };
        self.storage.save(&next.to_persisted()).await?;
        self.gateway.set_token(next.token.clone());
        let user = next.user.clone();
        self.state.send_replace(next);
        self.mark_ready();

        let user = user.ok_or_else(|| ClientError::Decode("login response without user".into()))?;
        tracing::info!(user_id = %user.id, role = %user.role, "login succeeded");
        Ok(user)
    }

    /// Clear the session everywhere and send the user to the login screen.
    ///
    /// Idempotent. Memory and the gateway token are always cleared; a storage
    /// failure is still reported so the caller can surface it.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let _writer = self.writer.lock().await;

        let cleared = self.storage.clear().await;
        self.gateway.clear_token();
        let previous = self.state.send_replace(SessionSnapshot::default());
        self.mark_ready();
        self.navigator.replace(Location::new(Route::Login.path()));

        if previous.is_authenticated() {
            tracing::info!("logged out");
        }

        cleared.map_err(|err| {
            tracing::error!(error = %err, "failed to clear persisted session");
            err.into()
        })
    }

    /// Replace the user record, keeping the token.
    ///
    /// Without a token the session stays unauthenticated.
    pub async fn set_user(&self, user: User) -> Result<(), ClientError> {
        let _writer = self.writer.lock().await;

        let mut next = self.snapshot();
        next.user = Some(user);
        if next.token.is_none() {
            tracing::warn!("user set without a token; session stays unauthenticated");
        }

        self.storage.save(&next.to_persisted()).await?;
        self.state.send_replace(next);
        self.mark_ready();
        Ok(())
    }

    fn mark_ready(&self) {
        self.hydration.send_if_modified(|h| {
            if *h == Hydration::Ready {
                false
            } else {
                *h = Hydration::Ready;
                true
            }
        });
    }
}

#[async_trait]
impl UnauthorizedHandler for SessionStore {
    async fn on_unauthorized(&self, rejected_token: Option<&str>) {
        let current = self.state.borrow().token.clone();
        if let Some(current) = current.as_deref() {
            if rejected_token != Some(current) {
                tracing::debug!("ignoring 401 for a request sent without the current token");
                return;
            }
        }

        tracing::warn!("session rejected by the API; logging out");
        if let Err(err) = self.logout().await {
            tracing::error!(error = %err, "forced logout could not clear storage");
        }
    }
}

/// Clears the in-flight flag when a login attempt settles.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
