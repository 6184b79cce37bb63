//! 弹性模式模块：按键管理的熔断器注册表。
//!
//! # Resilience Primitives Module
//!
//! Keeps callers from hammering a degraded AI provider.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`circuit_breaker`] | Consecutive-failure breaker for one upstream |
//! | [`registry`] | Breakers keyed by provider endpoint |
//! | [`clock`] | Time source, swappable for tests |
//!
//! ## Circuit Breaker
//!
//! - **Closed**: normal operation, failures accumulate
//! - **Open**: threshold reached, calls are rejected until the cooldown elapses
//! - **Half-Open**: cooldown elapsed; the next permission check resets to closed
//!
//! ```rust
//! use xpressionist_resilience::resilience::{BreakerRegistry, CircuitBreakerConfig};
//!
//! let breakers = BreakerRegistry::new(CircuitBreakerConfig::default());
//!
//! if breakers.can_proceed("grok:chat") {
//!     // Make API call...
//!     breakers.record_success("grok:chat");
//! }
//! ```

pub mod circuit_breaker;
pub mod clock;
pub mod registry;

pub use circuit_breaker::{
    BreakerStatus, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerSnapshot,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use registry::BreakerRegistry;
