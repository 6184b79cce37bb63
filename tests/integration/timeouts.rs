//! Deadline behavior against a server that never answers

use super::mock_server::{client_with_timeout, silent_server};
use serde_json::json;
use std::time::{Duration, Instant};
use xpressionist_resilience::{fetch_with_timeout, Error, Workload};

#[tokio::test]
async fn test_fetch_with_timeout_against_silent_server() {
    let addr = silent_server().await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let req = client.get(format!("http://{}/", addr));

    let started = Instant::now();
    let err = fetch_with_timeout(req, Duration::from_millis(10))
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(
        matches!(err, Error::Timeout { timeout } if timeout == Duration::from_millis(10)),
        "unexpected error: {:?}",
        err
    );
    assert!(elapsed < Duration::from_millis(60), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_guarded_timeout_counts_as_failure() {
    let addr = silent_server().await;
    let client = client_with_timeout(Duration::from_millis(20));
    let url = format!("http://{}/v1/chat/completions", addr);

    for _ in 0..3 {
        let req = client.transport().post_json(&url, &json!({}), None);
        let err = client.chat("grok", req, Workload::OsintSearch).await.unwrap_err();
        assert!(err.is_timeout());
    }
    assert!(!client.breakers().can_proceed("grok"));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = client_with_timeout(Duration::from_secs(5));
    let req = client
        .transport()
        .post_json(&format!("http://{}/", addr), &json!({}), None);

    let err = client.send_json("grok", req, Workload::Default).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "unexpected error: {:?}", err);
    assert_eq!(client.breakers().snapshot("grok").consecutive_failures, 1);
}
