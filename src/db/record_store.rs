// src/db/record_store.rs

use sqlx::SqlitePool;

use crate::common::error::AppError;

/// Logical name of the tickets collection blob.
pub const TICKETS_KEY: &str = "tickets";
/// Logical name of the settings record blob.
pub const SETTINGS_KEY: &str = "settings";

/// Durable key → JSON-blob storage over the `records` table. Values are
/// whole collections; there is no per-record indexing or querying, so
/// every higher-level mutation reads the whole blob, edits it in memory
/// and writes it back. O(collection size) per mutation, fine for a
/// single shop's ticket volume.
#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns the stored blob, or `None` if the key was never written.
    pub async fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM records WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    /// Replaces the entire value under `key`. The upsert is a single
    /// statement, so callers never observe a partial write.
    pub async fn write(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO records (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Deletes the key entirely. Removing an absent key is not an error.
    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM records WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_returns_none_for_unwritten_key() {
        let store = RecordStore::new(crate::db::test_pool().await);
        assert_eq!(store.read("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_replaces_whole_value() {
        let store = RecordStore::new(crate::db::test_pool().await);
        store.write("k", "[1,2]").await.unwrap();
        store.write("k", "[3]").await.unwrap();
        assert_eq!(store.read("k").await.unwrap().as_deref(), Some("[3]"));
    }

    #[tokio::test]
    async fn remove_deletes_key() {
        let store = RecordStore::new(crate::db::test_pool().await);
        store.write("k", "{}").await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.read("k").await.unwrap(), None);
        // removing again is a no-op
        store.remove("k").await.unwrap();
    }
}
