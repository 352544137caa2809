use async_trait::async_trait;
use sqlx::{query, query_as};

use crate::domain::StorageError;
use crate::domain::repositories::KeyValueStore;
use crate::infrastructure::database::DatabasePool;

/// Durable key-value store backed by a single SQLite table.
#[derive(Clone)]
pub struct SqlKeyValueStore {
    pool: DatabasePool,
}

impl SqlKeyValueStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqlKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let row: Option<(Vec<u8>,)> = query_as(r"SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;

        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        query(
            r"INSERT INTO kv_store (key, value)
               VALUES (?, ?)
               ON CONFLICT (key)
               DO UPDATE SET value = excluded.value,
                             updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        query(r"DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;

        Ok(())
    }
}
