//! Registry Service - Operator-facing endpoint maintenance
//!
//! Lists registered endpoints, registers new candidates after probing them,
//! and prunes endpoints that no longer pass the probe. Every write is
//! followed by a pool reload.

use crate::domain::entities::{EndpointRecord, EndpointStatus};
use crate::domain::ports::{EndpointMap, EndpointStore, StoreError};
use crate::domain::value_objects::CandidateFilter;
use crate::infrastructure::{PoolCache, Prober, ShutdownController};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a prune pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PruneReport {
    /// Endpoints probed
    pub checked: usize,
    /// Endpoints that passed and were kept
    pub kept: usize,
}

pub struct RegistryService {
    store: Arc<dyn EndpointStore>,
    pool: Arc<PoolCache>,
    prober: Arc<Prober>,
    filter: CandidateFilter,
    max_failures: u32,
}

impl RegistryService {
    pub fn new(
        store: Arc<dyn EndpointStore>,
        pool: Arc<PoolCache>,
        prober: Arc<Prober>,
        filter: CandidateFilter,
        max_failures: u32,
    ) -> Self {
        Self {
            store,
            pool,
            prober,
            filter,
            max_failures,
        }
    }

    /// All registered endpoints, sorted by URL.
    ///
    /// An endpoint whose failure count has reached the threshold is
    /// reported as `"0"` even if its stored flag is `"1"`. Listing queries
    /// the tracker for every URL, which starts tracking them.
    pub async fn list(&self) -> Result<Vec<EndpointRecord>, RegistryError> {
        let records = self.store.load_all().await?;
        let failures = self.pool.failures();

        Ok(records
            .into_iter()
            .map(|(url, stored)| {
                let status = if failures.failure_count(&url) >= self.max_failures {
                    EndpointStatus::Unusable
                } else {
                    stored
                };
                EndpointRecord::new(url, status)
            })
            .collect())
    }

    /// Filter, normalize and probe submitted URLs, then persist every
    /// verdict and reload the pool.
    ///
    /// Returns the verdicts written; empty when nothing survived filtering.
    pub async fn register(&self, submitted: &[String]) -> Result<EndpointMap, RegistryError> {
        let candidates = self.filter.prepare(submitted);
        if candidates.is_empty() {
            tracing::debug!("no acceptable candidates in {} submitted", submitted.len());
            return Ok(EndpointMap::new());
        }

        let verdicts = self.prober.probe(&candidates).await;
        self.store.upsert(&verdicts).await?;
        tracing::info!(
            "registered {} endpoints ({} usable)",
            verdicts.len(),
            verdicts.values().filter(|s| s.is_usable()).count()
        );

        // Write succeeded; a failed reload only delays the pool catching up
        let _ = self.pool.reload().await;
        Ok(verdicts)
    }

    /// Re-probe every registered endpoint and keep only those that pass.
    pub async fn prune(&self) -> Result<PruneReport, RegistryError> {
        let records = self.store.load_all().await?;
        if records.is_empty() {
            return Ok(PruneReport::default());
        }

        let urls: Vec<String> = records.into_keys().collect();
        let verdicts = self.prober.probe(&urls).await;
        let passing: EndpointMap = verdicts
            .into_iter()
            .filter(|(_, status)| status.is_usable())
            .collect();

        self.store.replace_all(&passing).await?;
        let report = PruneReport {
            checked: urls.len(),
            kept: passing.len(),
        };
        tracing::info!("prune kept {} of {} endpoints", report.kept, report.checked);

        let _ = self.pool.reload().await;
        Ok(report)
    }

    /// Run [`RegistryService::prune`] every `interval` until shutdown.
    pub fn start_prune_task(self: &Arc<Self>, interval: Duration, shutdown: ShutdownController) {
        let service = self.clone();
        let mut shutdown_rx = shutdown.subscribe();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // A prune longer than the interval is followed by one prune, not a burst
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; skip it so startup is not a prune
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = service.prune().await {
                            tracing::error!("scheduled prune failed: {}", e);
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        tracing::debug!("prune task stopped");
                        break;
                    }
                }
            }
        });
    }
}
