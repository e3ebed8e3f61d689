//! In-Memory Endpoint Store
//!
//! Implements EndpointStore without durability. Records are lost on
//! restart; intended for tests and throwaway deployments.

use crate::domain::ports::{EndpointMap, EndpointStore, StoreError};
use async_trait::async_trait;
use parking_lot::RwLock;

/// Lock-guarded in-memory record set.
///
/// One lock over the whole map, so `replace_all` is atomic for readers.
#[derive(Debug, Default)]
pub struct MemoryEndpointStore {
    records: RwLock<EndpointMap>,
}

impl MemoryEndpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records.
    pub fn with_records(records: EndpointMap) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl EndpointStore for MemoryEndpointStore {
    async fn load_all(&self) -> Result<EndpointMap, StoreError> {
        Ok(self.records.read().clone())
    }

    async fn upsert(&self, records: &EndpointMap) -> Result<(), StoreError> {
        let mut guard = self.records.write();
        for (url, status) in records {
            guard.insert(url.clone(), *status);
        }
        Ok(())
    }

    async fn replace_all(&self, records: &EndpointMap) -> Result<(), StoreError> {
        *self.records.write() = records.clone();
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::domain::entities::EndpointStatus;

    fn map(entries: &[(&str, EndpointStatus)]) -> EndpointMap {
        entries
            .iter()
            .map(|(url, status)| (url.to_string(), *status))
            .collect()
    }

    #[tokio::test]
    async fn test_new_store_is_empty() {
        let store = MemoryEndpointStore::new();
        assert!(store.is_empty());
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_overwrites_and_keeps_others() {
        let store = MemoryEndpointStore::with_records(map(&[
            ("http://a.example", EndpointStatus::Usable),
            ("http://b.example", EndpointStatus::Usable),
        ]));

        store
            .upsert(&map(&[
                ("http://a.example", EndpointStatus::Unusable),
                ("http://c.example", EndpointStatus::Usable),
            ]))
            .await
            .unwrap();

        let all = store.load_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all["http://a.example"], EndpointStatus::Unusable);
        assert_eq!(all["http://b.example"], EndpointStatus::Usable);
    }

    #[tokio::test]
    async fn test_replace_all_drops_missing() {
        let store = MemoryEndpointStore::with_records(map(&[
            ("http://a.example", EndpointStatus::Usable),
            ("http://b.example", EndpointStatus::Unusable),
        ]));

        store
            .replace_all(&map(&[("http://a.example", EndpointStatus::Usable)]))
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_load_all_is_sorted() {
        let store = MemoryEndpointStore::new();
        store
            .upsert(&map(&[
                ("http://c.example", EndpointStatus::Usable),
                ("http://a.example", EndpointStatus::Usable),
                ("http://b.example", EndpointStatus::Usable),
            ]))
            .await
            .unwrap();

        let keys: Vec<String> = store.load_all().await.unwrap().into_keys().collect();
        assert_eq!(keys, vec!["http://a.example", "http://b.example", "http://c.example"]);
    }
}
