//! Integration tests for `AnthropicProvider::complete` against `wiremock`.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use beacon_providers::{AiProvider, AnthropicProvider, ProviderError};

fn test_provider(base_url: &str) -> AnthropicProvider {
    AnthropicProvider::new("test-key", 5, 0, 0)
        .expect("failed to build test provider")
        .with_base_url(base_url)
}

#[tokio::test]
async fn complete_joins_text_blocks_and_sends_version_header() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "content": [
                { "type": "text", "text": "For teams I'd suggest " },
                { "type": "text", "text": "Linear." }
            ]
        })))
        .mount(&server)
        .await;

    let provider = test_provider(&server.uri());
    let result = provider.complete("best issue tracker?").await;

    assert_eq!(result.unwrap(), "For teams I'd suggest Linear.");
}

#[tokio::test]
async fn complete_skips_non_text_blocks() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "content": [
                { "type": "thinking", "thinking": "hmm" },
                { "type": "text", "text": "Notion." }
            ]
        })))
        .mount(&server)
        .await;

    let provider = test_provider(&server.uri());
    assert_eq!(provider.complete("q").await.unwrap(), "Notion.");
}

#[tokio::test]
async fn complete_treats_no_text_blocks_as_empty_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({ "content": [] })))
        .mount(&server)
        .await;

    let provider = test_provider(&server.uri());
    let result = provider.complete("q").await;

    assert!(matches!(
        result,
        Err(ProviderError::EmptyCompletion {
            provider: "anthropic"
        })
    ));
}

#[tokio::test]
async fn complete_maps_overloaded_to_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529))
        .mount(&server)
        .await;

    let provider = test_provider(&server.uri());
    let result = provider.complete("q").await;

    assert!(matches!(
        result,
        Err(ProviderError::UnexpectedStatus {
            provider: "anthropic",
            status: 529,
        })
    ));
}
