//! Pool Cache
//!
//! In-memory snapshot of the usable endpoints, rebuilt wholesale from the
//! durable store on every reload.

use crate::domain::ports::{EndpointStore, StoreError};
use crate::infrastructure::failure_tracker::FailureTracker;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Process-wide view of which endpoints are currently usable.
///
/// Readers get an `Arc` to an immutable list, so a reload swaps the whole
/// set at once and a reader never observes a partial one. Reloads run one
/// at a time, so an older store read can never overwrite a newer one.
pub struct PoolCache {
    store: Arc<dyn EndpointStore>,
    failures: Arc<FailureTracker>,
    endpoints: RwLock<Arc<Vec<String>>>,
    version: AtomicU64,
    reload_lock: Mutex<()>,
}

impl PoolCache {
    /// Create an empty cache; nothing is usable until the first reload.
    pub fn new(store: Arc<dyn EndpointStore>, failures: Arc<FailureTracker>) -> Self {
        Self {
            store,
            failures,
            endpoints: RwLock::new(Arc::new(Vec::new())),
            version: AtomicU64::new(0),
            reload_lock: Mutex::new(()),
        }
    }

    /// Replace the cached set with the store's `"1"` records and clear all
    /// failure counts.
    ///
    /// If the store cannot be read the previous set and counts are kept
    /// and the error is returned; an unreachable store never empties a
    /// working pool.
    pub async fn reload(&self) -> Result<usize, StoreError> {
        // Held across load and swap
        let _reloading = self.reload_lock.lock().await;
        let records = match self.store.load_all().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("pool reload failed, keeping previous pool: {}", e);
                return Err(e);
            }
        };

        let usable: Vec<String> = records
            .into_iter()
            .filter(|(_, status)| status.is_usable())
            .map(|(url, _)| url)
            .collect();
        let count = usable.len();

        {
            let mut guard = self.endpoints.write();
            *guard = Arc::new(usable);
            // Cleared under the write lock so no snapshot pairs the new
            // set with old counts
            self.failures.clear();
        }

        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!("pool reload ok, version={} endpoints={}", version, count);
        Ok(count)
    }

    /// Current candidate URLs. Callers copy before mutating.
    pub fn snapshot(&self) -> Arc<Vec<String>> {
        self.endpoints.read().clone()
    }

    pub fn len(&self) -> usize {
        self.endpoints.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.read().is_empty()
    }

    /// Number of successful reloads so far.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    pub fn failures(&self) -> &Arc<FailureTracker> {
        &self.failures
    }
}
