use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Row-level API of the backend data store.
///
/// Rows are addressed by their `id` column. Implementations own transport,
/// auth headers and timeouts.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Insert one row and return it as stored.
    async fn insert(&self, table: &str, row: Value) -> Result<Value>;

    /// Insert several rows in one request.
    async fn insert_many(&self, table: &str, rows: Vec<Value>) -> Result<()>;

    /// Apply `changes` to the row with `id` and return the updated row.
    async fn update(&self, table: &str, id: &str, changes: Value) -> Result<Value>;

    async fn delete(&self, table: &str, id: &str) -> Result<()>;

    /// Insert, or merge into the existing row with the same primary key.
    async fn upsert(&self, table: &str, row: Value) -> Result<()>;

    async fn fetch(&self, table: &str, id: &str) -> Result<Option<Value>>;
}

#[async_trait]
impl<R: RemoteStore + ?Sized> RemoteStore for Arc<R> {
    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        (**self).insert(table, row).await
    }

    async fn insert_many(&self, table: &str, rows: Vec<Value>) -> Result<()> {
        (**self).insert_many(table, rows).await
    }

    async fn update(&self, table: &str, id: &str, changes: Value) -> Result<Value> {
        (**self).update(table, id, changes).await
    }

    async fn delete(&self, table: &str, id: &str) -> Result<()> {
        (**self).delete(table, id).await
    }

    async fn upsert(&self, table: &str, row: Value) -> Result<()> {
        (**self).upsert(table, row).await
    }

    async fn fetch(&self, table: &str, id: &str) -> Result<Option<Value>> {
        (**self).fetch(table, id).await
    }
}
