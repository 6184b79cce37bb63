//! Breaker accounting around guarded calls

use super::mock_server::MockServerFixture;
use serde_json::json;
use std::time::Duration;
use xpressionist_resilience::{Error, Workload};

const CHAT_PATH: &str = "/v1/chat/completions";

#[tokio::test]
async fn test_chat_success_returns_content() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_response(CHAT_PATH, 200, r#"{"choices":[{"message":{"content":"hi"}}]}"#, 1)
        .await;
    let (client, _) = fixture.create_test_client();

    let req = client
        .transport()
        .post_json(&fixture.url(CHAT_PATH), &json!({"model": "grok-4"}), Some("test-key"));
    let content = client.chat("grok", req, Workload::Analysis).await.unwrap();

    assert_eq!(content, "hi");
    assert_eq!(client.breakers().snapshot("grok").consecutive_failures, 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_breaker_trips_after_three_server_errors() {
    let fixture = MockServerFixture::new().await;
    let failing = fixture
        .mock_json_response(CHAT_PATH, 500, r#"{"error":{"message":"upstream exploded"}}"#, 3)
        .await;
    let (client, clock) = fixture.create_test_client();
    let body = json!({"model": "grok-4"});

    for _ in 0..3 {
        let req = client.transport().post_json(&fixture.url(CHAT_PATH), &body, None);
        let err = client.chat("grok", req, Workload::Analysis).await.unwrap_err();
        assert!(
            matches!(err, Error::Remote { status: 500, ref message } if message == "upstream exploded"),
            "unexpected error: {:?}",
            err
        );
    }

    // Open: rejected without reaching the server.
    let req = client.transport().post_json(&fixture.url(CHAT_PATH), &body, None);
    let err = client.chat("grok", req, Workload::Analysis).await.unwrap_err();
    assert!(matches!(err, Error::ServiceUnavailable { ref key } if key == "grok"));
    assert_eq!(client.breakers().snapshot("grok").consecutive_failures, 3);
    failing.assert_async().await;

    // After the cooldown the next call goes through again.
    let healthy = fixture
        .mock_json_response("/v2/chat", 200, r#"{"choices":[{"message":{"content":"back"}}]}"#, 1)
        .await;
    clock.advance(Duration::from_secs(31));
    let req = client.transport().post_json(&fixture.url("/v2/chat"), &body, None);
    assert_eq!(client.chat("grok", req, Workload::Analysis).await.unwrap(), "back");
    healthy.assert_async().await;
}

#[tokio::test]
async fn test_keys_trip_independently() {
    let fixture = MockServerFixture::new().await;
    let _failing = fixture.mock_json_response("/fail", 503, "Service Unavailable", 3).await;
    let (client, _) = fixture.create_test_client();

    for _ in 0..3 {
        let req = client.transport().post_json(&fixture.url("/fail"), &json!({}), None);
        let _ = client.send_json("gemini:analysis", req, Workload::Analysis).await;
    }

    assert!(!client.breakers().can_proceed("gemini:analysis"));
    assert!(client.breakers().can_proceed("grok:chat"));
}

#[tokio::test]
async fn test_schema_violation_counts_as_failure() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_response(CHAT_PATH, 200, r#"{"choices":[{"message":{"text":"wrong field"}}]}"#, 1)
        .await;
    let (client, _) = fixture.create_test_client();

    let req = client.transport().post_json(&fixture.url(CHAT_PATH), &json!({}), None);
    let err = client.chat("grok", req, Workload::Analysis).await.unwrap_err();

    assert!(matches!(err, Error::Validation { .. }));
    assert_eq!(client.breakers().snapshot("grok").consecutive_failures, 1);
}

#[tokio::test]
async fn test_empty_choices_surface_as_error() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_response(CHAT_PATH, 200, r#"{"choices":[]}"#, 1)
        .await;
    let (client, _) = fixture.create_test_client();

    let req = client.transport().post_json(&fixture.url(CHAT_PATH), &json!({}), None);
    let err = client.chat("grok", req, Workload::Analysis).await.unwrap_err();
    assert!(matches!(err, Error::EmptyChoices { .. }));
}

#[tokio::test]
async fn test_success_clears_prior_failures() {
    let fixture = MockServerFixture::new().await;
    let _fail = fixture.mock_json_response("/fail", 502, "", 2).await;
    let _ok = fixture
        .mock_json_response("/ok", 200, r#"{"choices":[{"message":{"content":"fine"}}]}"#, 1)
        .await;
    let (client, _) = fixture.create_test_client();

    for _ in 0..2 {
        let req = client.transport().post_json(&fixture.url("/fail"), &json!({}), None);
        assert!(client.chat("grok", req, Workload::Analysis).await.is_err());
    }
    assert_eq!(client.breakers().snapshot("grok").consecutive_failures, 2);

    let req = client.transport().post_json(&fixture.url("/ok"), &json!({}), None);
    client.chat("grok", req, Workload::Analysis).await.unwrap();
    assert_eq!(client.breakers().snapshot("grok").consecutive_failures, 0);
}
