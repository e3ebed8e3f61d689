//! Reqwest Translation Upstream
//!
//! Implements TranslationUpstream with a shared reqwest client.

use crate::domain::ports::{TranslationUpstream, UpstreamError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// HTTP client for translation endpoints.
///
/// One connection pool is shared by live traffic and probes; the timeout
/// is applied per request.
#[derive(Clone)]
pub struct ReqwestUpstream {
    client: reqwest::Client,
}

impl ReqwestUpstream {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("translate-pool/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

fn classify(e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Transport(e.to_string())
    }
}

#[async_trait]
impl TranslationUpstream for ReqwestUpstream {
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, UpstreamError> {
        let resp = self
            .client
            .post(url)
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        // Body reads are covered by the same timeout; a stall here is a timeout too
        let bytes = resp.bytes().await.map_err(classify)?;
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}
