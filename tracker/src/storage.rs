//! Local key-value storage
//!
//! Each collection (roasts, beans, blends) is stored as one JSON snapshot
//! under a fixed key and rewritten whole on every change. A single user on a
//! single device is assumed, so the last write wins.

use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::config::StorageConfig;
use crate::error::AppResult;

/// Key holding the roast history
pub const ROASTS_KEY: &str = "roasts";
/// Key holding the bean name list
pub const BEANS_KEY: &str = "beansList";
/// Key holding the blend recipes
pub const BLENDS_KEY: &str = "blends";

/// Key-value store backed by a SQLite file
#[derive(Clone)]
pub struct KeyValueStore {
    pool: SqlitePool,
}

impl KeyValueStore {
    /// Open (creating if needed) the database file and its table
    pub async fn connect(config: &StorageConfig) -> AppResult<Self> {
        if let Some(parent) = config.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let db_url = format!("sqlite:{}", config.database_path.display());
        let options = SqliteConnectOptions::from_str(&db_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(config.busy_timeout_secs));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        tracing::debug!("Opened storage at {}", config.database_path.display());
        Self::with_pool(pool).await
    }

    /// Wrap an existing pool, creating the table if it is missing
    pub async fn with_pool(pool: SqlitePool) -> AppResult<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// Read a stored value.
    ///
    /// A value that no longer parses is logged and reported as missing so a
    /// damaged snapshot does not lock the user out of the tool.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw: String = row.get("value");

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::error!("Stored value under '{}' is unreadable: {}", key, e);
                Ok(None)
            }
        }
    }

    /// Read a stored value or its type's default
    pub async fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> AppResult<T> {
        Ok(self.get(key).await?.unwrap_or_default())
    }

    /// Replace the value stored under `key`
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        let raw = serde_json::to_string(value)?;
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(&raw)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::debug!("Stored {} bytes under '{}'", raw.len(), key);
        Ok(())
    }

    /// Delete a key. Returns whether anything was stored there.
    pub async fn remove(&self, key: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
