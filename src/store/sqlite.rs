// SQLite-backed token store
// Keeps tokens in an `auth_kv` key/value table so sessions survive restarts

use anyhow::Context;
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::TokenStore;
use crate::error::{ClientError, Result};

const CREATE_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS auth_kv (key TEXT PRIMARY KEY NOT NULL, value TEXT NOT NULL)";

/// Durable store backed by a single SQLite file
pub struct SqliteTokenStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl SqliteTokenStore {
    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create token store directory: {}", parent.display())
                })?;
            }
        }

        tracing::debug!("Opening token store: {}", path.display());
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database: {}", path.display()))?;
        conn.execute(CREATE_TABLE, [])
            .context("Failed to create auth_kv table")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory SQLite")?;
        conn.execute(CREATE_TABLE, [])
            .context("Failed to create auth_kv table")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Database location, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run a statement on the blocking pool
    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| ClientError::Storage("SQLite connection lock poisoned".to_string()))?;
            op(&conn).map_err(|e| ClientError::Storage(e.to_string()))
        })
        .await
        .map_err(|e| ClientError::Internal(anyhow::anyhow!("Token store task failed: {}", e)))?
    }
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.run(move |conn| {
            conn.query_row("SELECT value FROM auth_kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let key = key.to_string();
        let value = value.to_string();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO auth_kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                [key, value],
            )
            .map(|_| ())
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.run(move |conn| {
            conn.execute("DELETE FROM auth_kv WHERE key = ?1", [key])
                .map(|_| ())
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.run(|conn| conn.execute("DELETE FROM auth_kv", []).map(|_| ()))
            .await
    }
}
