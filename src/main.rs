//! translate-pool - Translation endpoint pool with failover dispatch
//!
//! This is the composition root that wires together all the components.

use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;
use translate_pool::adapters::inbound::{ApiServer, ApiState};
use translate_pool::adapters::outbound::{
    MemoryEndpointStore, ReqwestUpstream, SqliteEndpointStore,
};
use translate_pool::application::{DispatchConfig, Dispatcher, RegistryService};
use translate_pool::config::{load_config, StoreBackend};
use translate_pool::domain::ports::{EndpointStore, TranslationUpstream};
use translate_pool::domain::services::ReplyCheck;
use translate_pool::domain::value_objects::CandidateFilter;
use translate_pool::infrastructure::{
    shutdown_signal, FailureTracker, PoolCache, ProbeConfig, Prober, ShutdownController,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting translate-pool listen={} store={:?} key={}",
        cfg.listen_addr,
        cfg.store_backend,
        cfg.record_key()
    );

    // ===== COMPOSITION ROOT =====

    // 1. Outbound adapters
    let store: Arc<dyn EndpointStore> = match cfg.store_backend {
        StoreBackend::Sqlite => Arc::new(SqliteEndpointStore::open(
            cfg.db_path.clone(),
            cfg.record_key(),
        )?),
        StoreBackend::Memory => {
            tracing::warn!("using in-memory endpoint store, registrations will not survive restart");
            Arc::new(MemoryEndpointStore::new())
        }
    };
    let upstream: Arc<dyn TranslationUpstream> = Arc::new(ReqwestUpstream::new()?);

    // 2. Pool state
    let pool = Arc::new(PoolCache::new(store.clone(), Arc::new(FailureTracker::new())));
    match pool.reload().await {
        Ok(n) => tracing::info!("loaded {} usable endpoints", n),
        Err(e) => tracing::error!("initial pool load failed: {}", e),
    }

    // 3. Application services
    let dispatcher = Arc::new(Dispatcher::new(
        pool.clone(),
        upstream.clone(),
        DispatchConfig {
            max_failures: cfg.max_failures,
            timeout: Duration::from_millis(cfg.dispatch_timeout_ms),
            check: ReplyCheck::non_empty(),
        },
    ));
    let prober = Arc::new(Prober::new(
        upstream,
        ProbeConfig::with_timeout(Duration::from_millis(cfg.probe_timeout_ms)),
    ));
    let registry = Arc::new(RegistryService::new(
        store,
        pool,
        prober,
        CandidateFilter::new(cfg.ignore_keywords.clone()),
        cfg.max_failures,
    ));

    // 4. Background tasks
    let shutdown = ShutdownController::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    if cfg.prune_interval_secs > 0 {
        tracing::info!("scheduled prune every {}s", cfg.prune_interval_secs);
        registry.start_prune_task(
            Duration::from_secs(cfg.prune_interval_secs),
            shutdown.clone(),
        );
    }

    // 5. Inbound adapter
    let state = ApiState::new(dispatcher, registry, cfg.password.clone());
    let server = ApiServer::new(cfg.listen_addr.clone(), cfg.static_dir.clone(), state);

    server.run(shutdown).await
}
