//! Dispatcher - Failover engine for live translation traffic
//!
//! Picks a live endpoint at random, forwards the request, validates the
//! reply and retries against other endpoints until one succeeds or the
//! attempt budget runs out.

use crate::domain::ports::{TranslationUpstream, UpstreamError};
use crate::domain::services::{CandidateSet, ReplyCheck};
use crate::infrastructure::PoolCache;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Dispatch configuration.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Failure count at which an endpoint stops being offered to new requests
    pub max_failures: u32,
    /// Timeout for each outbound call
    pub timeout: Duration,
    /// Shape check applied to every reply
    pub check: ReplyCheck,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_failures: 3,
            timeout: Duration::from_secs(5),
            check: ReplyCheck::non_empty(),
        }
    }
}

/// Why a request could not be served.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("no endpoints available")]
    NoEndpoints,
    #[error("all endpoints failed after {attempts} attempts")]
    Exhausted { attempts: usize },
}

/// Why a single attempt failed. Never leaves the dispatcher.
#[derive(Debug, thiserror::Error)]
enum AttemptError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("reply failed shape check")]
    BadReply,
}

/// Failover dispatcher.
///
/// Failure counts are shared across requests through the pool's tracker:
/// - an endpoint whose count reaches `max_failures` is no longer offered
///   to new requests until the next reload;
/// - within one request, a failing endpoint whose count already exceeds
///   `max_failures` is dropped from that request's candidates, otherwise
///   its count is incremented and it may be drawn again.
pub struct Dispatcher {
    pool: Arc<PoolCache>,
    upstream: Arc<dyn TranslationUpstream>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(
        pool: Arc<PoolCache>,
        upstream: Arc<dyn TranslationUpstream>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            pool,
            upstream,
            config,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Forward `body` to `<endpoint><path>` with failover.
    ///
    /// Makes at most as many outbound calls as there were eligible
    /// endpoints when the request started.
    pub async fn dispatch(&self, path: &str, body: &Value) -> Result<Value, DispatchError> {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("dispatch", %request_id, path);
        self.dispatch_inner(path, body).instrument(span).await
    }

    async fn dispatch_inner(&self, path: &str, body: &Value) -> Result<Value, DispatchError> {
        let candidates = self.candidates().await;
        if candidates.is_empty() {
            tracing::warn!("no endpoints available");
            return Err(DispatchError::NoEndpoints);
        }

        let failures = self.pool.failures();
        let mut set = CandidateSet::new(candidates);
        let mut attempts = 0;

        loop {
            let (index, endpoint) = {
                let mut rng = rand::thread_rng();
                match set.pick(&mut rng) {
                    Some((index, url)) => (index, url.to_string()),
                    None => break,
                }
            };
            attempts += 1;

            let target = format!("{}{}", endpoint, path);
            tracing::debug!("attempt {} -> {}", attempts, target);

            match self.attempt(&target, body).await {
                Ok(reply) => {
                    failures.record_success(&endpoint);
                    tracing::info!("served by {} after {} attempts", endpoint, attempts);
                    return Ok(reply);
                }
                Err(e) => {
                    tracing::warn!("request failure: {}: {}", target, e);
                    if failures.failure_count(&endpoint) > self.config.max_failures {
                        set.evict(index);
                        tracing::debug!("evicted {} for this request", endpoint);
                    } else {
                        failures.record_failure(&endpoint);
                    }
                }
            }

            set.spend_attempt();
        }

        tracing::warn!("all endpoints failed after {} attempts", attempts);
        Err(DispatchError::Exhausted { attempts })
    }

    /// Eligible endpoints, reloading the pool once if none are left.
    async fn candidates(&self) -> Vec<String> {
        let eligible = self.eligible();
        if !eligible.is_empty() {
            return eligible;
        }

        tracing::info!("no eligible endpoints, reloading pool");
        // A failed reload keeps the old pool; carry on with whatever it holds
        let _ = self.pool.reload().await;
        self.eligible()
    }

    fn eligible(&self) -> Vec<String> {
        let failures = self.pool.failures();
        self.pool
            .snapshot()
            .iter()
            .filter(|url| failures.failure_count(url) < self.config.max_failures)
            .cloned()
            .collect()
    }

    async fn attempt(&self, target: &str, body: &Value) -> Result<Value, AttemptError> {
        let reply = self
            .upstream
            .post_json(target, body, self.config.timeout)
            .await?;
        if self.config.check.accepts(&reply) {
            Ok(reply)
        } else {
            Err(AttemptError::BadReply)
        }
    }
}
