//! # xpressionist-resilience
//!
//! X-pressionist AI 调用路由的弹性层：熔断器、超时请求与供应商响应校验。
//!
//! Resilience layer for the X-pressionist AI-calling routes: keyed circuit
//! breakers, deadline-bounded HTTP calls, and validators/extractors for the
//! JSON shapes returned by Grok, OpenRouter (Gemini image models) and GetImg.
//!
//! ## Overview
//!
//! A route acquires permission from the breaker for its provider key, sends
//! the request with a workload-specific deadline, runs the body through the
//! matching extractor, and reports the outcome back to the breaker.
//! [`ResilientClient`] does all four steps; the pieces are also usable on
//! their own.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use xpressionist_resilience::{ResilienceConfig, ResilientClient, Workload};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> xpressionist_resilience::Result<()> {
//!     let client = ResilientClient::from_config(&ResilienceConfig::from_env()?)?;
//!
//!     let request = client.transport().post_json(
//!         "https://api.x.ai/v1/chat/completions",
//!         &json!({"model": "grok-4", "messages": [{"role": "user", "content": "Roast @jack"}]}),
//!         std::env::var("GROK_API_KEY").ok().as_deref(),
//!     );
//!     let roast = client.chat("grok:chat", request, Workload::Analysis).await?;
//!     println!("{}", roast);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`resilience`] | Circuit breakers and the keyed registry |
//! | [`transport`] | Deadline-bounded fetch and the pooled HTTP transport |
//! | [`providers`] | Per-provider response decoders and extractors |
//! | [`client`] | Guarded calls composing the three above |
//! | [`config`] | Breaker policy, timeouts and HTTP settings |

pub mod client;
pub mod config;
pub mod providers;
pub mod resilience;
pub mod transport;

pub use client::{ResilientClient, ResilientClientBuilder};
pub use config::{HttpConfig, ResilienceConfig, TimeoutConfig};
pub use providers::{
    extract_chat_content, extract_image_result_a, extract_image_result_b, ImageOutcome,
    ProviderKind, ProviderResponse,
};
pub use resilience::{BreakerRegistry, CircuitBreakerConfig};
pub use transport::{fetch_with_timeout, with_timeout, Workload};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
