//! 受熔断器保护的供应商调用。
//!
//! Guarded provider calls.
//!
//! Composes the breaker registry, the deadline-bounded transport and the
//! provider extractors: check permission, send, decode, report the outcome.
//! Retry policy stays with the caller.

pub mod builder;
pub mod core;
mod response;

pub use builder::ResilientClientBuilder;
pub use core::ResilientClient;
