//! Mock HTTP server setup for integration tests

use mockito::{Mock, Server, ServerGuard};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use xpressionist_resilience::resilience::ManualClock;
use xpressionist_resilience::{ResilienceConfig, ResilientClient, ResilientClientBuilder};

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Client with default policy and a manual clock for cooldown control.
    pub fn create_test_client(&self) -> (ResilientClient, ManualClock) {
        let clock = ManualClock::new();
        let client = ResilientClientBuilder::new()
            .clock(Arc::new(clock.clone()))
            .build()
            .expect("client builds");
        (client, clock)
    }

    /// Create a mock for a JSON response that must be hit exactly `hits` times
    pub async fn mock_json_response(&self, path: &str, status: u16, body: &str, hits: usize) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", path)
            .with_status(status as usize)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }
}

/// Client whose every workload shares one short deadline.
pub fn client_with_timeout(timeout: Duration) -> ResilientClient {
    let mut cfg = ResilienceConfig::default();
    cfg.timeouts.default = timeout;
    cfg.timeouts.analysis = timeout;
    cfg.timeouts.osint_search = timeout;
    cfg.timeouts.image_generation = timeout;
    ResilientClient::from_config(&cfg).expect("client builds")
}

/// A TCP server that accepts connections and never answers.
pub async fn silent_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}
