//! # Key-Value Repository
//!
//! String values under string keys in the `kv_store` table.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  kv_store                                                           │
//! │  ┌──────────────┬───────────────────────────┬─────────────────────┐ │
//! │  │ key (PK)     │ value (JSON text)         │ updated_at          │ │
//! │  ├──────────────┼───────────────────────────┼─────────────────────┤ │
//! │  │ products     │ [{"id":"1","name":...}]   │ 2026-10-15T10:02Z   │ │
//! │  │ customers    │ [{"id":"1","name":...}]   │ 2026-10-15T09:58Z   │ │
//! │  │ transactions │ [{"invoice_number":...}]  │ 2026-10-15T10:02Z   │ │
//! │  └──────────────┴───────────────────────────┴─────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values are opaque here; decoding is the core crate's job.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const UPSERT: &str = r#"
    INSERT INTO kv_store (key, value, updated_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
"#;

/// Repository for the `kv_store` table.
#[derive(Debug, Clone)]
pub struct KvRepository {
    pool: SqlitePool,
}

impl KvRepository {
    pub fn new(pool: SqlitePool) -> Self {
        KvRepository { pool }
    }

    /// Returns the stored value, or `None` for an unknown key.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// Like [`KvRepository::get`] but an unknown key is `NotFound`.
    pub async fn require(&self, key: &str) -> DbResult<String> {
        self.get(key)
            .await?
            .ok_or_else(|| DbError::not_found("key", key))
    }

    /// Inserts or replaces a value.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, bytes = value.len(), "Writing key");

        sqlx::query(UPSERT)
            .bind(key)
            .bind(value)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Writes several values in one transaction. All or nothing.
    pub async fn set_many(&self, entries: &[(String, String)]) -> DbResult<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for (key, value) in entries {
            sqlx::query(UPSERT)
                .bind(key)
                .bind(value)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(count = entries.len(), "Wrote keys");
        Ok(entries.len())
    }

    /// Deletes a key. Returns whether it existed.
    pub async fn delete(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All keys, sorted.
    pub async fn keys(&self) -> DbResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM kv_store ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }

    /// Every `(key, value)` pair, sorted by key.
    pub async fn load_all(&self) -> DbResult<Vec<(String, String)>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM kv_store ORDER BY key")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows)
    }

    /// When `key` was last written.
    pub async fn updated_at(&self, key: &str) -> DbResult<Option<DateTime<Utc>>> {
        let at: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT updated_at FROM kv_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(at)
    }
}
