//! Durable session storage.
//!
//! The session is persisted as two keys, `token` and `user`, under the
//! `auth-storage` namespace. Writes replace both keys in one step so a reader
//! never observes one without the other.

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use stockpanel_auth::User;
use thiserror::Error;

pub const NAMESPACE: &str = "auth-storage";
const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage failed: {0}")]
    Backend(String),
    #[error("persisted session is corrupt: {0}")]
    Corrupt(String),
}

impl From<anyhow::Error> for StorageError {
    fn from(err: anyhow::Error) -> Self {
        StorageError::Backend(format!("{err:#}"))
    }
}

/// What survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl PersistedSession {
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }
}

/// Key-value persistence for the session.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn load(&self) -> Result<PersistedSession, StorageError>;

    /// Replace the persisted session. `None` fields remove their key.
    async fn save(&self, session: &PersistedSession) -> Result<(), StorageError>;

    async fn clear(&self) -> Result<(), StorageError> {
        self.save(&PersistedSession::default()).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory
// ─────────────────────────────────────────────────────────────────────────────

/// Process-local storage; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    session: Mutex<PersistedSession>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds a session, as if written by a previous run.
    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            session: Mutex::new(session),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent write fail (disk full, revoked permissions...).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> PersistedSession {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn load(&self) -> Result<PersistedSession, StorageError> {
        Ok(self.snapshot())
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("writes disabled".into()));
        }
        *self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = session.clone();
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite-backed storage (one small key-value table).
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open (creating if needed) the database file at `path`.
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create session directory at {:?}", parent))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open session database at {:?}", path))?;

        Self::with_pool(pool).await
    }

    /// Private in-memory database. A single connection keeps every query on
    /// the same database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("failed to create in-memory session database")?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> anyhow::Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                namespace  TEXT NOT NULL,
                key        TEXT NOT NULL,
                value      TEXT NOT NULL,
                updated_at DATETIME NOT NULL,
                PRIMARY KEY (namespace, key)
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create kv_store table")?;

        Ok(Self { pool })
    }

    async fn read_key(&self, key: &str) -> anyhow::Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT value
            FROM kv_store
            WHERE namespace = ?1
              AND key = ?2
            "#,
        )
        .bind(NAMESPACE)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to read '{key}' from session storage"))?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SessionStorage for SqliteStorage {
    async fn load(&self) -> Result<PersistedSession, StorageError> {
        let token = self.read_key(TOKEN_KEY).await?;
        let user = match self.read_key(USER_KEY).await? {
            Some(raw) => Some(
                serde_json::from_str::<User>(&raw)
                    .map_err(|e| StorageError::Corrupt(format!("user record: {e}")))?,
            ),
            None => None,
        };
        Ok(PersistedSession { token, user })
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        let user = session
            .user
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StorageError::Backend(format!("failed to serialize user: {e}")))?;
        let now = Utc::now();

        let result: anyhow::Result<()> = async {
            let mut tx = self
                .pool
                .begin()
                .await
                .context("failed to begin session write")?;

            for (key, value) in [(TOKEN_KEY, session.token.as_deref()), (USER_KEY, user.as_deref())] {
                match value {
                    Some(value) => {
                        sqlx::query(
                            r#"
                            INSERT INTO kv_store (namespace, key, value, updated_at)
                            VALUES (?1, ?2, ?3, ?4)
                            ON CONFLICT(namespace, key)
                            DO UPDATE SET
                                value = excluded.value,
                                updated_at = excluded.updated_at
                            "#,
                        )
                        .bind(NAMESPACE)
                        .bind(key)
                        .bind(value)
                        .bind(now)
                        .execute(&mut *tx)
                        .await
                        .with_context(|| format!("failed to write '{key}'"))?;
                    }
                    None => {
                        sqlx::query("DELETE FROM kv_store WHERE namespace = ?1 AND key = ?2")
                            .bind(NAMESPACE)
                            .bind(key)
                            .execute(&mut *tx)
                            .await
                            .with_context(|| format!("failed to delete '{key}'"))?;
                    }
                }
            }

            tx.commit().await.context("failed to commit session write")?;
            Ok(())
        }
        .await;

        result.map_err(StorageError::from)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use stockpanel_auth::Role;
    use stockpanel_core::UserId;

    use super::*;

    fn user() -> User {
        User {
            id: UserId::new("u1").unwrap(),
            email: "admin@example.com".into(),
            first_name: "Ada".into(),
            last_name: "Admin".into(),
            role: Role::Admin,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn sqlite_round_trips_and_clears() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        assert!(storage.load().await.unwrap().is_empty());

        let session = PersistedSession {
            token: Some("tok-1".into()),
            user: Some(user()),
        };
        storage.save(&session).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), session);

        storage.clear().await.unwrap();
        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sqlite_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.db");

        let session = PersistedSession {
            token: Some("tok-2".into()),
            user: Some(user()),
        };
        SqliteStorage::open(&path).await.unwrap().save(&session).await.unwrap();

        let reopened = SqliteStorage::open(&path).await.unwrap();
        assert_eq!(reopened.load().await.unwrap(), session);
    }

    #[tokio::test]
    async fn corrupt_user_record_is_reported() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        sqlx::query(
            "INSERT INTO kv_store (namespace, key, value, updated_at) VALUES (?1, 'user', '{not json', 'now')",
        )
        .bind(NAMESPACE)
        .execute(&storage.pool)
        .await
        .unwrap();

        assert!(matches!(storage.load().await, Err(StorageError::Corrupt(_))));
    }

    #[tokio::test]
    async fn writes_record_when_each_key_changed() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let before = Utc::now();
        storage
            .save(&PersistedSession {
                token: Some("tok-3".into()),
                user: Some(user()),
            })
            .await
            .unwrap();

        let row = sqlx::query("SELECT updated_at FROM kv_store WHERE namespace = ?1 AND key = 'token'")
            .bind(NAMESPACE)
            .fetch_one(&storage.pool)
            .await
            .unwrap();
        let updated_at: chrono::DateTime<Utc> = row.try_get("updated_at").unwrap();
        assert!(updated_at >= before - chrono::Duration::seconds(1));
    }

    #[tokio::test]
    async fn memory_storage_can_fail_writes() {
        let storage = MemoryStorage::new();
        storage.fail_writes(true);
        assert!(storage.clear().await.is_err());
        storage.fail_writes(false);
        assert!(storage.clear().await.is_ok());
    }
}
