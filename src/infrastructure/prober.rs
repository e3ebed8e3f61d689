//! Endpoint Prober
//!
//! Validates candidate endpoints with a fixed synthetic translation call.

use crate::domain::entities::EndpointStatus;
use crate::domain::ports::{EndpointMap, TranslationUpstream};
use crate::domain::services::ReplyCheck;
use crate::domain::value_objects::TRANSLATE_SUFFIX;
use futures::future::join_all;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

/// Phrase sent by every probe.
pub const PROBE_TEXT: &str = "Hello, World!";
/// Text a healthy endpoint must return for [`PROBE_TEXT`].
pub const PROBE_EXPECTED: &str = "你好，世界";

/// Probe configuration.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Timeout for each probe
    pub timeout: Duration,
    /// Request body sent to `<endpoint>/translate`
    pub payload: Value,
    /// Reply check deciding the verdict
    pub check: ReplyCheck,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(2000),
            payload: json!({
                "text": PROBE_TEXT,
                "source_lang": "EN",
                "target_lang": "ZH",
            }),
            check: ReplyCheck::containing(PROBE_EXPECTED),
        }
    }
}

impl ProbeConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// Sends synthetic probes and collapses each outcome to a verdict.
pub struct Prober {
    upstream: Arc<dyn TranslationUpstream>,
    config: ProbeConfig,
}

impl Prober {
    pub fn new(upstream: Arc<dyn TranslationUpstream>, config: ProbeConfig) -> Self {
        Self { upstream, config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Probe every distinct URL concurrently and wait for all verdicts.
    ///
    /// Errors and timeouts become `Unusable`; nothing is propagated.
    pub async fn probe(&self, urls: &[String]) -> EndpointMap {
        let unique: BTreeSet<&str> = urls.iter().map(String::as_str).collect();
        let checks = unique.into_iter().map(|url| async move {
            let status = self.probe_one(url).await;
            (url.to_string(), status)
        });

        let verdicts: EndpointMap = join_all(checks).await.into_iter().collect();
        let healthy = verdicts.values().filter(|s| s.is_usable()).count();
        tracing::info!("probed {} endpoints, {} healthy", verdicts.len(), healthy);
        verdicts
    }

    /// Probe a single endpoint.
    pub async fn probe_one(&self, url: &str) -> EndpointStatus {
        let target = format!("{}{}", url, TRANSLATE_SUFFIX);
        match self
            .upstream
            .post_json(&target, &self.config.payload, self.config.timeout)
            .await
        {
            Ok(reply) if self.config.check.accepts(&reply) => EndpointStatus::Usable,
            Ok(reply) => {
                tracing::debug!("probe {} returned unexpected reply: {}", url, reply);
                EndpointStatus::Unusable
            }
            Err(e) => {
                tracing::debug!("probe {} failed: {}", url, e);
                EndpointStatus::Unusable
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::domain::ports::UpstreamError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Upstream returning canned replies per target URL.
    #[derive(Default)]
    struct CannedUpstream {
        replies: HashMap<String, Result<Value, UpstreamError>>,
        calls: Mutex<Vec<String>>,
    }

    impl CannedUpstream {
        fn reply(mut self, target: &str, reply: Result<Value, UpstreamError>) -> Self {
            self.replies.insert(target.to_string(), reply);
            self
        }
    }

    #[async_trait]
    impl TranslationUpstream for CannedUpstream {
        async fn post_json(
            &self,
            url: &str,
            _body: &Value,
            _timeout: Duration,
        ) -> Result<Value, UpstreamError> {
            self.calls.lock().push(url.to_string());
            self.replies
                .get(url)
                .cloned()
                .unwrap_or(Err(UpstreamError::Transport("refused".to_string())))
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_probe_config_default() {
        let config = ProbeConfig::default();
        assert_eq!(config.timeout, Duration::from_millis(2000));
        assert_eq!(config.payload["text"], PROBE_TEXT);
        assert_eq!(config.payload["target_lang"], "ZH");
        assert_eq!(config.check.expected(), Some(PROBE_EXPECTED));
    }

    #[tokio::test]
    async fn test_probe_verdicts() {
        let upstream = CannedUpstream::default()
            .reply(
                "http://good.example/translate",
                Ok(json!({"code": 200, "data": "你好，世界！"})),
            )
            .reply(
                "http://wrong.example/translate",
                Ok(json!({"code": 200, "data": "Bonjour"})),
            )
            .reply("http://slow.example/translate", Err(UpstreamError::Timeout));
        let prober = Prober::new(Arc::new(upstream), ProbeConfig::default());

        let verdicts = prober
            .probe(&urls(&[
                "http://good.example",
                "http://wrong.example",
                "http://slow.example",
                "http://down.example",
            ]))
            .await;

        assert_eq!(verdicts["http://good.example"], EndpointStatus::Usable);
        assert_eq!(verdicts["http://wrong.example"], EndpointStatus::Unusable);
        assert_eq!(verdicts["http://slow.example"], EndpointStatus::Unusable);
        assert_eq!(verdicts["http://down.example"], EndpointStatus::Unusable);
    }

    #[tokio::test]
    async fn test_probe_deduplicates() {
        let upstream = Arc::new(CannedUpstream::default().reply(
            "http://good.example/translate",
            Ok(json!({"data": "你好，世界"})),
        ));
        let prober = Prober::new(upstream.clone(), ProbeConfig::default());

        let verdicts = prober
            .probe(&urls(&["http://good.example", "http://good.example"]))
            .await;

        assert_eq!(verdicts.len(), 1);
        assert_eq!(upstream.calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_probe_is_idempotent() {
        let upstream = CannedUpstream::default().reply(
            "http://bad.example/translate",
            Ok(json!({"data": "Hello, World!"})),
        );
        let prober = Prober::new(Arc::new(upstream), ProbeConfig::default());
        let input = urls(&["http://bad.example"]);

        let first = prober.probe(&input).await;
        let second = prober.probe(&input).await;

        assert_eq!(first, second);
        assert_eq!(first["http://bad.example"], EndpointStatus::Unusable);
    }

    #[tokio::test]
    async fn test_probe_empty_input() {
        let upstream = Arc::new(CannedUpstream::default());
        let prober = Prober::new(upstream.clone(), ProbeConfig::default());

        assert!(prober.probe(&[]).await.is_empty());
        assert!(upstream.calls.lock().is_empty());
    }
}
