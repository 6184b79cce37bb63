//! Image generation calls: safety blocks and empty results are values

use super::mock_server::MockServerFixture;
use serde_json::json;
use xpressionist_resilience::ImageOutcome;

#[tokio::test]
async fn test_openrouter_safety_block_is_ok_and_resets_breaker() {
    let fixture = MockServerFixture::new().await;
    let _fail = fixture.mock_json_response("/fail", 500, "", 2).await;
    let _blocked = fixture
        .mock_json_response(
            "/api/v1/chat/completions",
            200,
            r#"{"choices":[{"finish_reason":"stop","native_finish_reason":"IMAGE_SAFETY","message":{"content":""}}]}"#,
            1,
        )
        .await;
    let (client, _) = fixture.create_test_client();

    for _ in 0..2 {
        let req = client.transport().post_json(&fixture.url("/fail"), &json!({}), None);
        assert!(client.generate_image_openrouter("openrouter:image", req).await.is_err());
    }

    let req = client
        .transport()
        .post_json(&fixture.url("/api/v1/chat/completions"), &json!({}), None);
    let outcome = client
        .generate_image_openrouter("openrouter:image", req)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Some(ImageOutcome::SafetyBlocked {
            reason: "IMAGE_SAFETY".into()
        })
    );
    assert_eq!(
        client.breakers().snapshot("openrouter:image").consecutive_failures,
        0
    );
}

#[tokio::test]
async fn test_openrouter_image_url() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_response(
            "/img",
            200,
            r#"{"choices":[{"message":{"images":[{"type":"image_url","image_url":{"url":"data:image/png;base64,iVBORw0KGgo="}}]}}]}"#,
            1,
        )
        .await;
    let (client, _) = fixture.create_test_client();

    let req = client.transport().post_json(&fixture.url("/img"), &json!({}), None);
    let outcome = client.generate_image_openrouter("openrouter:image", req).await.unwrap();
    assert_eq!(
        outcome.and_then(|o| o.url().map(str::to_owned)).as_deref(),
        Some("data:image/png;base64,iVBORw0KGgo=")
    );
}

#[tokio::test]
async fn test_getimg_priority_and_empty() {
    let fixture = MockServerFixture::new().await;
    let _both = fixture
        .mock_json_response(
            "/v1/flux-schnell/text-to-image",
            200,
            r#"{"image":"iVBORw0KGgo=","url":"https://cdn.getimg.ai/x.jpg","seed":7}"#,
            1,
        )
        .await;
    let _none = fixture
        .mock_json_response("/v1/empty", 200, r#"{"seed":7,"cost":0.003}"#, 1)
        .await;
    let (client, _) = fixture.create_test_client();

    let req = client.transport().post_json(
        &fixture.url("/v1/flux-schnell/text-to-image"),
        &json!({"prompt": "cartoon"}),
        Some("getimg-key"),
    );
    let image = client.generate_image_getimg("getimg", req).await.unwrap();
    assert_eq!(image.as_deref(), Some("iVBORw0KGgo="));

    let req = client.transport().post_json(&fixture.url("/v1/empty"), &json!({}), None);
    assert_eq!(client.generate_image_getimg("getimg", req).await.unwrap(), None);
}
