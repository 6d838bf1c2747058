//! # Document Store
//!
//! Records are kept as JSON documents in a single SQLite table, one row per
//! record, tagged with the collection they belong to. The [`DocumentStore`]
//! trait is the only surface the rest of the backend sees.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use shared::{Fields, Record};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::debug;

/// Failures raised by a document store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record '{id}' not found in collection '{collection}'")]
    NotFound { collection: String, id: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document could not be encoded or decoded: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("stored document '{id}' is not a JSON object")]
    InvalidDocument { id: String },
}

/// Substring match on one field, ignoring case
#[derive(Debug, Clone, PartialEq)]
pub struct Contains {
    pub field: String,
    pub needle: String,
}

/// Parameters of a `find_many` call
#[derive(Debug, Clone, PartialEq)]
pub struct FindMany {
    pub contains: Option<Contains>,
    /// Field to sort ascending by; insertion order when `None`
    pub order_by: Option<String>,
    pub take: u32,
}

impl FindMany {
    pub fn take(take: u32) -> Self {
        Self {
            contains: None,
            order_by: None,
            take,
        }
    }
}

/// Generic create/read/update/delete over named collections of documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a new document under a freshly generated id
    async fn create(&self, collection: &str, fields: Fields) -> Result<Record, StoreError>;

    async fn find_many(&self, collection: &str, query: &FindMany) -> Result<Vec<Record>, StoreError>;

    /// Replace every field of an existing document
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<Record, StoreError>;

    /// Remove a document, returning what it held
    async fn delete(&self, collection: &str, id: &str) -> Result<Record, StoreError>;
}

/// DbConnection manages the SQLite pool backing the document store
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if needed) the database at `url`
    pub async fn new(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// A private in-memory database. The pool is pinned to one connection
    /// that never expires, because each SQLite memory connection is its own
    /// database.
    #[cfg(test)]
    pub async fn init_test() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                collection TEXT NOT NULL,
                body TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_documents_collection
            ON documents(collection, seq);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// JSON path addressing a top-level field, quoted so any field name works
fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field.replace('"', "\\\""))
}

fn decode(id: String, body: &str) -> Result<Record, StoreError> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(fields) => Ok(Record::new(id, fields)),
        _ => Err(StoreError::InvalidDocument { id }),
    }
}

#[async_trait]
impl DocumentStore for DbConnection {
    async fn create(&self, collection: &str, fields: Fields) -> Result<Record, StoreError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let body = serde_json::to_string(&fields)?;

        sqlx::query("INSERT INTO documents (id, collection, body) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(collection)
            .bind(&body)
            .execute(self.pool())
            .await?;

        debug!("Created {} in '{}'", id, collection);
        Ok(Record::new(id, fields))
    }

    async fn find_many(&self, collection: &str, query: &FindMany) -> Result<Vec<Record>, StoreError> {
        let contains = query.contains.as_ref().filter(|c| !c.needle.is_empty());

        let mut sql = String::from("SELECT id, body FROM documents WHERE collection = ?");
        if contains.is_some() {
            sql.push_str(" AND instr(lower(coalesce(json_extract(body, ?), '')), lower(?)) > 0");
        }
        if query.order_by.is_some() {
            sql.push_str(" ORDER BY json_extract(body, ?) ASC, seq ASC");
        } else {
            sql.push_str(" ORDER BY seq ASC");
        }
        sql.push_str(" LIMIT ?");

        let mut q = sqlx::query(&sql).bind(collection);
        if let Some(c) = contains {
            q = q.bind(json_path(&c.field)).bind(&c.needle);
        }
        if let Some(field) = &query.order_by {
            q = q.bind(json_path(field));
        }
        let rows = q.bind(i64::from(query.take)).fetch_all(self.pool()).await?;

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("id")?;
                let body: String = row.try_get("body")?;
                decode(id, &body)
            })
            .collect()
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<Record, StoreError> {
        let body = serde_json::to_string(&fields)?;

        let result = sqlx::query("UPDATE documents SET body = ? WHERE collection = ? AND id = ?")
            .bind(&body)
            .bind(collection)
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }

        Ok(Record::new(id, fields))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<Record, StoreError> {
        let row = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ? RETURNING id, body")
            .bind(collection)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        match row {
            Some(r) => {
                let id: String = r.try_get("id")?;
                let body: String = r.try_get("body")?;
                decode(id, &body)
            }
            None => Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
        }
    }
}
