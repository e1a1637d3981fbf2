//! Record store for persisting JSON documents in named collections.
//!
//! The session core never touches the store; the binary uses it to keep an
//! event log, and library users can open one for their own bookkeeping.

mod sqlite;

pub use sqlite::SqliteStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Record store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("stored record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Identifier assigned on insert.
    pub cid: i64,
    pub value: Value,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Collection-oriented document storage.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store a new document and return its identifier.
    async fn insert(&self, collection: &str, value: Value) -> Result<i64, StoreError>;

    async fn get(&self, collection: &str, cid: i64) -> Result<Option<Record>, StoreError>;

    /// All documents of a collection in insertion order.
    async fn list(&self, collection: &str) -> Result<Vec<Record>, StoreError>;

    /// Documents whose top-level `field` equals `value`.
    async fn query(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Record>, StoreError>;

    /// Merge the keys of `value` into the stored object. Non-object values
    /// replace the document. Returns `false` if the record does not exist.
    async fn update(&self, collection: &str, cid: i64, value: Value) -> Result<bool, StoreError>;

    /// Overwrite the document. Returns `false` if the record does not exist.
    async fn replace(&self, collection: &str, cid: i64, value: Value)
    -> Result<bool, StoreError>;

    /// Returns `false` if the record did not exist.
    async fn remove(&self, collection: &str, cid: i64) -> Result<bool, StoreError>;
}

/// Shallow merge used by [`RecordStore::update`].
pub(crate) fn merge(existing: Value, patch: Value) -> Value {
    match (existing, patch) {
        (Value::Object(mut base), Value::Object(patch)) => {
            base.extend(patch);
            Value::Object(base)
        }
        (_, patch) => patch,
    }
}
