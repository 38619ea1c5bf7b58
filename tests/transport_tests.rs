//! End-to-end tests of the chat model over the reqwest transport.

use futures::StreamExt;
use integrations_gemini_chat::config::{AuthMethod, GeminiConfig, GeminiConfigBuilder, StreamFormat};
use integrations_gemini_chat::error::{GeminiError, NetworkError, RateLimitError, RequestError};
use integrations_gemini_chat::fixtures::load_fixture;
use integrations_gemini_chat::observability::NoopLogger;
use integrations_gemini_chat::services::{ChatModel, GeminiChatModel};
use integrations_gemini_chat::types::{Prompt, Usage};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STREAM_PATH: &str = "/v1beta/models/gemini-2.0-flash:streamGenerateContent";
const CALL_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn model_for(
    server: &MockServer,
    configure: impl FnOnce(GeminiConfigBuilder) -> GeminiConfigBuilder,
) -> GeminiChatModel {
    let builder = GeminiConfig::builder()
        .api_key(SecretString::new("test-api-key".into()))
        .base_url(&server.uri())
        .unwrap()
        .max_retries(0);
    GeminiChatModel::builder()
        .config(configure(builder).build().unwrap())
        .logger(Box::new(NoopLogger))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_stream_json_array_end_to_end() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .and(header("x-goog-api-key", "test-api-key"))
        .and(body_json(serde_json::json!({
            "contents": [{"role": "user", "parts": [{"text": "Say hello"}]}],
            "generationConfig": {"temperature": 0.7}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(load_fixture("stream/hello_world.json"), "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;
    let model = model_for(&server, |builder| builder);

    // Act
    let items: Vec<_> = model.stream(Prompt::from("Say hello")).await.unwrap().collect().await;

    // Assert
    let last = items.last().unwrap().as_ref().unwrap();
    assert!(last.is_completed());
    assert_eq!(last.response().result().unwrap().text(), "Hello, world");
    assert_eq!(last.response().metadata.usage, Usage::new(5, 10));
    assert!(items.iter().all(|item| item.is_ok()));
}

#[tokio::test]
async fn test_stream_sse_end_to_end_with_rate_limit() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .and(query_param("alt", "sse"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ratelimit-remaining-requests", "7")
                .insert_header("x-ratelimit-remaining-tokens", "9000")
                .set_body_raw(load_fixture("stream/hello_world.sse"), "text/event-stream"),
        )
        .mount(&server)
        .await;
    let model = model_for(&server, |builder| builder.stream_format(StreamFormat::ServerSentEvents));

    // Act
    let items: Vec<_> = model.stream(Prompt::from("Say hello")).await.unwrap().collect().await;

    // Assert
    assert_eq!(items.len(), 4);
    let last = items[3].as_ref().unwrap();
    assert!(last.is_completed());
    assert_eq!(last.response().result().unwrap().text(), "Hello, world");
    let rate_limit = last.response().metadata.rate_limit.clone().unwrap();
    assert_eq!(rate_limit.requests_remaining, Some(7));
    assert_eq!(rate_limit.tokens_remaining, Some(9000));
}

#[tokio::test]
async fn test_truncated_body_end_to_end() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(load_fixture("stream/truncated.json"), "application/json"),
        )
        .mount(&server)
        .await;
    let model = model_for(&server, |builder| builder);

    // Act
    let items: Vec<_> = model.stream(Prompt::from("Say hello")).await.unwrap().collect().await;

    // Assert
    assert_eq!(items.len(), 3);
    assert!(items[2].as_ref().unwrap_err().is_truncated_stream());
}

#[tokio::test]
async fn test_call_retries_after_rate_limit() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CALL_PATH))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "0")
                .set_body_raw(load_fixture("chat/error_429.json"), "application/json"),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(CALL_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(load_fixture("chat/success_response.json"), "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;
    let model = model_for(&server, |builder| builder.max_retries(1));

    // Act
    let response = model.call(Prompt::from("Say hello")).await.unwrap();

    // Assert
    assert_eq!(response.result().unwrap().text(), "Hello, world");
}

#[tokio::test]
async fn test_call_with_query_param_auth() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CALL_PATH))
        .and(query_param("key", "test-api-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(load_fixture("chat/success_response.json"), "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;
    let model = model_for(&server, |builder| builder.auth_method(AuthMethod::QueryParam));

    // Act
    let response = model.call(Prompt::from("Say hello")).await.unwrap();

    // Assert
    assert_eq!(response.result().unwrap().text(), "Hello, world");
    assert_eq!(response.metadata.usage.total_tokens, Some(15));
}

#[tokio::test]
async fn test_stream_rate_limited_before_body() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "30")
                .set_body_raw(load_fixture("chat/error_429.json"), "application/json"),
        )
        .mount(&server)
        .await;
    let model = model_for(&server, |builder| builder);

    // Act
    let error = model.stream(Prompt::from("Hi")).await.err().unwrap();

    // Assert
    assert!(matches!(error, GeminiError::RateLimit(RateLimitError::TooManyRequests { .. })));
    assert_eq!(error.retry_after(), Some(Duration::from_secs(30)));
}

#[tokio::test]
async fn test_call_invalid_argument_maps_to_request_error() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CALL_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_raw(
            r#"{"error":{"code":400,"message":"temperature out of range","status":"INVALID_ARGUMENT"}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;
    let model = model_for(&server, |builder| builder);

    // Act
    let error = model.call(Prompt::from("Hi")).await.unwrap_err();

    // Assert
    match error {
        GeminiError::Request(RequestError::ValidationError { message }) => {
            assert_eq!(message, "temperature out of range");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_request_timeout_is_network_error() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CALL_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_raw(load_fixture("chat/success_response.json"), "application/json"),
        )
        .mount(&server)
        .await;
    let model = model_for(&server, |builder| builder.timeout(Duration::from_millis(200)));

    // Act
    let error = model.call(Prompt::from("Hi")).await.unwrap_err();

    // Assert
    assert!(matches!(error, GeminiError::Network(NetworkError::Timeout { .. })));
    assert!(error.is_retryable());
}
