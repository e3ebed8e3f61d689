//! Translation Upstream Port
//!
//! Defines the interface for calling a translation endpoint.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Why a single outbound call failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("reply is not valid JSON: {0}")]
    Decode(String),
}

/// Outbound JSON-over-HTTP call to one endpoint.
///
/// A non-2xx status is an error; so is a body that is not JSON.
#[async_trait]
pub trait TranslationUpstream: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, UpstreamError>;
}
