use super::{fetch_with_timeout, TransportError, Workload};
use crate::config::{HttpConfig, TimeoutConfig};
use crate::{Error, Result};
use reqwest::Proxy;
use std::env;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

/// Header carrying our per-call correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Pooled HTTP client plus the per-workload deadlines it sends with.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeouts: TimeoutConfig,
}

impl HttpTransport {
    pub fn new(http: &HttpConfig, timeouts: TimeoutConfig) -> Result<Self> {
        // No client-wide request timeout: the per-call deadline is authoritative.
        let mut builder = reqwest::Client::builder()
            .connect_timeout(http.connect_timeout)
            .pool_max_idle_per_host(http.pool_max_idle_per_host)
            .pool_idle_timeout(Some(http.pool_idle_timeout))
            .tcp_keepalive(Some(Duration::from_secs(30)));

        // Only the configured proxy is used; system proxy variables are ignored.
        builder = builder.no_proxy();
        if let Some(proxy_url) = &http.proxy_url {
            match Proxy::all(proxy_url) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => warn!(proxy_url = %proxy_url, error = %e, "ignoring invalid proxy url"),
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self { client, timeouts })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn timeouts(&self) -> &TimeoutConfig {
        &self.timeouts
    }

    /// Read a provider API key from `<PROVIDER>_API_KEY`, e.g. `GROK_API_KEY`.
    pub fn api_key(provider_id: &str) -> Option<String> {
        let env_var = format!(
            "{}_API_KEY",
            provider_id
                .to_uppercase()
                .replace(|c: char| matches!(c, '-' | ' ' | '.'), "_")
        );
        env::var(env_var).ok().filter(|k| !k.trim().is_empty())
    }

    /// JSON POST with bearer auth and a fresh request id.
    pub fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        api_key: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .post(url)
            .json(body)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());
        if let Some(key) = api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Send with the deadline configured for `workload`.
    pub async fn send(
        &self,
        request: reqwest::RequestBuilder,
        workload: Workload,
    ) -> Result<reqwest::Response> {
        fetch_with_timeout(request, self.timeouts.for_workload(workload)).await
    }
}
