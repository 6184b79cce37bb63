//! Integration tests with mock HTTP server

pub mod breaker_flow;
pub mod image_calls;
pub mod mock_server;
pub mod timeouts;
