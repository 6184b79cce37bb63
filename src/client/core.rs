use super::response::read_json;
use crate::config::ResilienceConfig;
use crate::providers::{
    extract_chat_content, extract_image_result_a, extract_image_result_b, ImageOutcome,
};
use crate::resilience::BreakerRegistry;
use crate::transport::{with_timeout, HttpTransport, Workload};
use crate::{Error, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// HTTP client that routes every call through a keyed circuit breaker.
///
/// Keys are caller-defined; one per provider endpoint (e.g. `grok:chat`,
/// `openrouter:image`) keeps a failing endpoint from blocking its siblings.
#[derive(Debug, Clone)]
pub struct ResilientClient {
    pub(crate) transport: HttpTransport,
    pub(crate) breakers: Arc<BreakerRegistry>,
}

impl ResilientClient {
    pub fn new(transport: HttpTransport, breakers: Arc<BreakerRegistry>) -> Self {
        Self {
            transport,
            breakers,
        }
    }

    pub fn from_config(cfg: &ResilienceConfig) -> Result<Self> {
        super::ResilientClientBuilder::new()
            .config(cfg.clone())
            .build()
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    pub fn breakers(&self) -> &Arc<BreakerRegistry> {
        &self.breakers
    }

    /// Send `request` under breaker `key` and run `extract` on the JSON body.
    ///
    /// Fails with [`Error::ServiceUnavailable`] without sending anything while
    /// the breaker is open. Upstream failures (timeout, transport, non-2xx,
    /// malformed body, failed extraction) are recorded against the key; a
    /// successful extraction resets it.
    pub async fn call<T, F>(
        &self,
        key: &str,
        request: reqwest::RequestBuilder,
        workload: Workload,
        extract: F,
    ) -> Result<T>
    where
        F: FnOnce(&Value) -> Result<T>,
    {
        if !self.breakers.can_proceed(key) {
            return Err(Error::ServiceUnavailable {
                key: key.to_string(),
            });
        }

        let started = Instant::now();
        let res = self.attempt(request, workload, extract).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &res {
            Ok(_) => {
                debug!(key, elapsed_ms, "provider call succeeded");
                self.breakers.record_success(key);
            }
            Err(e) if e.counts_against_upstream() => {
                warn!(key, elapsed_ms, error = %e, "provider call failed");
                self.breakers.record_failure(key);
            }
            Err(e) => debug!(key, error = %e, "provider call aborted locally"),
        }
        res
    }

    async fn attempt<T, F>(
        &self,
        request: reqwest::RequestBuilder,
        workload: Workload,
        extract: F,
    ) -> Result<T>
    where
        F: FnOnce(&Value) -> Result<T>,
    {
        let timeout = self.transport.timeouts().for_workload(workload);
        let started = Instant::now();
        let resp = self.transport.send(request, workload).await?;

        // The body shares the same deadline as the headers.
        let remaining = timeout.saturating_sub(started.elapsed());
        let body = with_timeout(read_json(resp), remaining)
            .await
            .map_err(|e| match e {
                Error::Timeout { .. } => Error::Timeout { timeout },
                other => other,
            })?;
        extract(&body)
    }

    /// Guarded call returning the raw JSON body.
    pub async fn send_json(
        &self,
        key: &str,
        request: reqwest::RequestBuilder,
        workload: Workload,
    ) -> Result<Value> {
        self.call(key, request, workload, |v| Ok(v.clone())).await
    }

    /// Guarded chat completion; returns the first choice's text.
    pub async fn chat(
        &self,
        key: &str,
        request: reqwest::RequestBuilder,
        workload: Workload,
    ) -> Result<String> {
        self.call(key, request, workload, extract_chat_content).await
    }

    /// Guarded OpenRouter image generation.
    ///
    /// A safety block or a missing image is `Ok`; the caller decides whether
    /// to retry with a different prompt.
    pub async fn generate_image_openrouter(
        &self,
        key: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<ImageOutcome>> {
        self.call(key, request, Workload::ImageGeneration, extract_image_result_a)
            .await
    }

    /// Guarded GetImg generation; returns inline base64 or an image URL.
    pub async fn generate_image_getimg(
        &self,
        key: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<String>> {
        self.call(key, request, Workload::ImageGeneration, extract_image_result_b)
            .await
    }
}
