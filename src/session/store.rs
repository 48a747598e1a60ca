//! Durable key-value slots for session snapshots

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Key-value persistence for small serialized snapshots
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>, SnapshotError>;
    async fn save(&self, key: &str, value: &str) -> Result<(), SnapshotError>;
    /// Deleting a missing key is not an error
    async fn delete(&self, key: &str) -> Result<(), SnapshotError>;
}

/// Process-local store, lost when the process exits
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), SnapshotError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), SnapshotError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Snapshots kept in a SQLite table, surviving restarts
#[derive(Clone)]
pub struct SqliteSnapshotStore {
    pool: Pool<Sqlite>,
}

impl SqliteSnapshotStore {
    /// Open (creating if needed) the database at `url` and its snapshot table
    pub async fn connect(url: &str) -> Result<Self, SnapshotError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self::from_pool(pool);
        store.create_table().await?;
        Ok(store)
    }

    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn create_table(&self) -> Result<(), SnapshotError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session_snapshots (
                snapshot_key TEXT PRIMARY KEY,
                snapshot_data TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn load(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        let data = sqlx::query_scalar::<_, String>(
            "SELECT snapshot_data FROM session_snapshots WHERE snapshot_key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(data)
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), SnapshotError> {
        sqlx::query(
            r#"
            INSERT INTO session_snapshots (snapshot_key, snapshot_data, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT (snapshot_key) DO UPDATE
            SET snapshot_data = excluded.snapshot_data, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), SnapshotError> {
        sqlx::query("DELETE FROM session_snapshots WHERE snapshot_key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
