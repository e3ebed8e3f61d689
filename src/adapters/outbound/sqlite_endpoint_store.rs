//! SQLite Endpoint Store
//!
//! Implements EndpointStore using SQLite for durable storage.
//! Each operation opens its own connection on the blocking pool.

use crate::domain::entities::EndpointStatus;
use crate::domain::ports::{EndpointMap, EndpointStore, StoreError};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::time::Duration;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS endpoints (
    record_key TEXT NOT NULL,
    url TEXT NOT NULL,
    status TEXT NOT NULL,
    PRIMARY KEY (record_key, url)
)";

/// SQLite-backed endpoint store.
///
/// All records live under one record key (e.g. `urls` or `prod:urls`),
/// so several deployments can share a database file.
pub struct SqliteEndpointStore {
    db_path: String,
    record_key: String,
}

impl SqliteEndpointStore {
    /// Open the store, creating the schema if needed.
    pub fn open(db_path: impl Into<String>, record_key: impl Into<String>) -> Result<Self, StoreError> {
        let store = Self {
            db_path: db_path.into(),
            record_key: record_key.into(),
        };
        let conn = Self::connect(&store.db_path)?;
        conn.execute(SCHEMA, [])?;
        tracing::info!(
            "endpoint store ready at {} (key={})",
            store.db_path,
            store.record_key
        );
        Ok(store)
    }

    pub fn record_key(&self) -> &str {
        &self.record_key
    }

    fn connect(db_path: &str) -> rusqlite::Result<Connection> {
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    /// Run a closure against a fresh connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection, &str) -> rusqlite::Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        let record_key = self.record_key.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = Self::connect(&db_path)?;
            f(&mut conn, &record_key)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("spawn_blocking error: {}", e)))?
        .map_err(StoreError::from)
    }

    fn write_records(
        tx: &rusqlite::Transaction<'_>,
        record_key: &str,
        records: &EndpointMap,
    ) -> rusqlite::Result<()> {
        let mut stmt = tx.prepare(
            "INSERT INTO endpoints (record_key, url, status) VALUES (?1, ?2, ?3)
             ON CONFLICT (record_key, url) DO UPDATE SET status = excluded.status",
        )?;
        for (url, status) in records {
            stmt.execute(params![record_key, url, status.as_flag()])?;
        }
        Ok(())
    }
}

#[async_trait]
impl EndpointStore for SqliteEndpointStore {
    async fn load_all(&self) -> Result<EndpointMap, StoreError> {
        self.with_conn(|conn, record_key| {
            let mut stmt =
                conn.prepare("SELECT url, status FROM endpoints WHERE record_key = ?1")?;
            let rows = stmt.query_map(params![record_key], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    EndpointStatus::from_flag(&row.get::<_, String>(1)?),
                ))
            })?;
            let records = rows.collect::<rusqlite::Result<EndpointMap>>()?;
            Ok(records)
        })
        .await
    }

    async fn upsert(&self, records: &EndpointMap) -> Result<(), StoreError> {
        let records = records.clone();
        let count = records.len();
        self.with_conn(move |conn, record_key| {
            let tx = conn.transaction()?;
            Self::write_records(&tx, record_key, &records)?;
            tx.commit()
        })
        .await?;
        tracing::debug!("upserted {} endpoint records", count);
        Ok(())
    }

    async fn replace_all(&self, records: &EndpointMap) -> Result<(), StoreError> {
        let records = records.clone();
        let count = records.len();
        self.with_conn(move |conn, record_key| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM endpoints WHERE record_key = ?1",
                params![record_key],
            )?;
            Self::write_records(&tx, record_key, &records)?;
            tx.commit()
        })
        .await?;
        tracing::debug!("replaced endpoint records, {} kept", count);
        Ok(())
    }
}
