//! SQLite-backed record store.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{info, warn};

use super::{Record, RecordStore, StoreError, merge};

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

type RecordRow = (i64, String, i64, i64);

/// Store handle with connection pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connection acquire timeout.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Maximum time a connection can remain idle before being closed.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Open (or create) the store at `path`, running migrations if needed.
    /// `:memory:` opens a private in-memory database.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        let pool = if path == ":memory:" {
            // Unique shared-cache name per call so parallel tests never collide.
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let memdb_uri = format!(
                "file:tmi-client-memdb-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                id
            );

            let options = SqliteConnectOptions::new()
                .filename(&memdb_uri)
                .shared_cache(true)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(1)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .connect_with(options)
                .await?
        } else {
            if let Some(parent) = Path::new(path).parent()
                && !parent.as_os_str().is_empty()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                warn!(path = %parent.display(), error = %e, "Failed to create store directory");
            }

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .connect_with(options)
                .await?
        };

        info!(path = %path, "Record store connected");

        sqlx::migrate!("./migrations").run(&pool).await?;

        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&pool)
            .await?;
        sqlx::query("PRAGMA synchronous=NORMAL")
            .execute(&pool)
            .await?;

        Ok(Self { pool })
    }

    /// Get reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn to_record((cid, body, created_at, updated_at): RecordRow) -> Result<Record, StoreError> {
        Ok(Record {
            cid,
            value: serde_json::from_str(&body)?,
            created_at,
            updated_at,
        })
    }

    async fn write_body(&self, collection: &str, cid: i64, value: &Value) -> Result<bool, StoreError> {
        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query(
            "UPDATE records SET body = ?, updated_at = ? WHERE collection = ? AND cid = ?",
        )
        .bind(serde_json::to_string(value)?)
        .bind(now)
        .bind(collection)
        .bind(cid)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert(&self, collection: &str, value: Value) -> Result<i64, StoreError> {
        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query(
            r#"
            INSERT INTO records (collection, body, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(collection)
        .bind(serde_json::to_string(&value)?)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn get(&self, collection: &str, cid: i64) -> Result<Option<Record>, StoreError> {
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT cid, body, created_at, updated_at FROM records WHERE collection = ? AND cid = ?",
        )
        .bind(collection)
        .bind(cid)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::to_record).transpose()
    }

    async fn list(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        let rows = sqlx::query_as::<_, RecordRow>(
            "SELECT cid, body, created_at, updated_at FROM records WHERE collection = ? ORDER BY cid",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::to_record).collect()
    }

    async fn query(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Record>, StoreError> {
        let records = self.list(collection).await?;
        Ok(records
            .into_iter()
            .filter(|record| record.value.get(field) == Some(value))
            .collect())
    }

    async fn update(&self, collection: &str, cid: i64, value: Value) -> Result<bool, StoreError> {
        let Some(existing) = self.get(collection, cid).await? else {
            return Ok(false);
        };
        let merged = merge(existing.value, value);
        self.write_body(collection, cid, &merged).await
    }

    async fn replace(
        &self,
        collection: &str,
        cid: i64,
        value: Value,
    ) -> Result<bool, StoreError> {
        self.write_body(collection, cid, &value).await
    }

    async fn remove(&self, collection: &str, cid: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM records WHERE collection = ? AND cid = ?")
            .bind(collection)
            .bind(cid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
