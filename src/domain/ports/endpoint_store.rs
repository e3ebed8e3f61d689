//! Endpoint Store Port
//!
//! Defines the interface for the durable endpoint record set.
//! Implementations may use SQLite or in-memory storage.

use crate::domain::entities::EndpointStatus;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// URL -> status flag, ordered by URL.
pub type EndpointMap = BTreeMap<String, EndpointStatus>;

/// Failure to reach or update the durable store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("endpoint store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Durable store holding one record per registered endpoint.
///
/// This is an outbound port. It is the single source of truth for the
/// pool; the in-memory pool cache is rebuilt from it on every reload.
#[async_trait]
pub trait EndpointStore: Send + Sync {
    /// Read every record.
    async fn load_all(&self) -> Result<EndpointMap, StoreError>;

    /// Insert or overwrite the given records, leaving others untouched.
    async fn upsert(&self, records: &EndpointMap) -> Result<(), StoreError>;

    /// Drop every record and store exactly the given ones.
    async fn replace_all(&self, records: &EndpointMap) -> Result<(), StoreError>;
}
