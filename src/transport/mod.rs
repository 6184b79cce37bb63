//! 传输层：带超时取消的 HTTP 请求。
//!
//! Deadline-bounded HTTP transport.
//!
//! [`with_timeout`] bounds any fallible future; [`fetch_with_timeout`] applies
//! it to a `reqwest` request. On expiry the in-flight future is dropped, which
//! aborts the connection, and the deadline timer is dropped with it.

pub mod http;

pub use http::HttpTransport;

use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Deadline used when the caller does not pick a workload.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Kind of upstream work, used to pick a deadline from
/// [`TimeoutConfig`](crate::config::TimeoutConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Workload {
    #[default]
    Default,
    /// Fast text analysis (roasts, summaries).
    Analysis,
    /// Exhaustive search-backed dossier generation.
    OsintSearch,
    ImageGeneration,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}

/// Run `fut`, failing with [`Error::Timeout`] if it has not finished within `timeout`.
pub async fn with_timeout<F, T>(fut: F, timeout: Duration) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(res) => res,
        Err(_) => {
            debug!(timeout_ms = timeout.as_millis() as u64, "deadline exceeded");
            Err(Error::Timeout { timeout })
        }
    }
}

/// Send `request`, cancelling it after `timeout`.
///
/// Returns the response before its body is read; status is not inspected.
pub async fn fetch_with_timeout(
    request: reqwest::RequestBuilder,
    timeout: Duration,
) -> Result<reqwest::Response> {
    with_timeout(
        async move {
            request
                .send()
                .await
                .map_err(|e| Error::Transport(TransportError::Http(e)))
        },
        timeout,
    )
    .await
}
