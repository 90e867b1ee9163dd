//! Integration tests for `GeminiProvider::complete` against `wiremock`.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use beacon_providers::{AiProvider, GeminiProvider, ProviderError};

fn test_provider(base_url: &str) -> GeminiProvider {
    GeminiProvider::new("test-key", 5, 0, 0)
        .expect("failed to build test provider")
        .with_base_url(base_url)
        .with_model("gemini-test")
}

#[tokio::test]
async fn complete_returns_first_candidate_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Try " },
                        { "text": "ClickUp." }
                    ],
                    "role": "model"
                }
            }]
        })))
        .mount(&server)
        .await;

    let provider = test_provider(&server.uri());
    let result = provider.complete("best planner?").await;

    assert_eq!(result.unwrap(), "Try ClickUp.");
}

#[tokio::test]
async fn complete_treats_missing_candidates_as_empty_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let provider = test_provider(&server.uri());
    let result = provider.complete("q").await;

    assert!(matches!(
        result,
        Err(ProviderError::EmptyCompletion { provider: "gemini" })
    ));
}

#[tokio::test]
async fn complete_maps_429_to_rate_limited_with_default_delay() {
    let server = MockServer::start().await;

    // No retry-after header: the delay defaults to 1 second.
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let provider = test_provider(&server.uri());
    let result = provider.complete("q").await;

    match result {
        Err(ProviderError::RateLimited {
            provider: "gemini",
            retry_after_secs,
        }) => assert_eq!(retry_after_secs, 1),
        other => panic!("expected RateLimited, got: {other:?}"),
    }
}
