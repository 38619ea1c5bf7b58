//! Integration tests for the embedding model against the mock transport.

use integrations_gemini_chat::config::GeminiConfig;
use integrations_gemini_chat::error::{GeminiError, RateLimitError, RequestError};
use integrations_gemini_chat::fixtures::load_fixture;
use integrations_gemini_chat::mocks::MockHttpTransport;
use integrations_gemini_chat::observability::NoopLogger;
use integrations_gemini_chat::resilience::RetryConfig;
use integrations_gemini_chat::services::embeddings::MAX_BATCH_SIZE;
use integrations_gemini_chat::services::{EmbeddingModel, GeminiEmbeddingModel};
use integrations_gemini_chat::transport::HttpMethod;
use integrations_gemini_chat::types::{
    Content, EmbedContentRequest, EmbeddingOptions, EmbeddingRequest, Part, TaskType, Usage,
};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

fn model_with(transport: Arc<MockHttpTransport>, retry: RetryConfig) -> GeminiEmbeddingModel {
    let config = GeminiConfig::builder()
        .api_key(SecretString::new("test-api-key".into()))
        .retry_config(retry)
        .build()
        .unwrap();
    GeminiEmbeddingModel::builder()
        .config(config)
        .transport(transport)
        .logger(Box::new(NoopLogger))
        .build()
        .unwrap()
}

fn request_body(transport: &MockHttpTransport) -> Value {
    let request = transport.last_request().unwrap();
    serde_json::from_slice(&request.body.unwrap()).unwrap()
}

#[tokio::test]
async fn test_call_embeds_every_input_in_order() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, &load_fixture("embeddings/batch_response.json"));
    let model = model_with(transport.clone(), RetryConfig::no_retry());

    // Act
    let response = model
        .call(EmbeddingRequest::new(["Hello world", "Goodbye world"]))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[0].index, 0);
    assert_eq!(response.results[1].index, 1);
    assert_eq!(response.results[0].output.len(), 4);
    assert!((response.results[1].output[0] + 0.0075132865).abs() < 1e-6);
    assert_eq!(response.metadata.model, "gemini-embedding-exp-03-07");
    assert_eq!(response.metadata.usage, Usage::empty());

    transport.verify_request_count(1);
    transport.verify_request(
        0,
        HttpMethod::Post,
        "/v1beta/models/gemini-embedding-exp-03-07:batchEmbedContents",
    );
    transport.verify_header(0, "x-goog-api-key", "test-api-key");
}

#[tokio::test]
async fn test_call_sends_merged_options() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, &load_fixture("embeddings/batch_response.json"));
    let config = GeminiConfig::builder()
        .api_key(SecretString::new("test-api-key".into()))
        .max_retries(0)
        .build()
        .unwrap();
    let model = GeminiEmbeddingModel::builder()
        .config(config)
        .transport(transport.clone())
        .default_options(
            EmbeddingOptions::default()
                .with_model("text-embedding-004")
                .with_http_header("x-team", "search"),
        )
        .logger(Box::new(NoopLogger))
        .build()
        .unwrap();
    let request = EmbeddingRequest::new(["Hello world", "Goodbye world"]).with_options(
        EmbeddingOptions::default()
            .with_dimensions(256)
            .with_task_type(TaskType::SemanticSimilarity),
    );

    // Act
    model.call(request).await.unwrap();

    // Assert
    transport.verify_request(0, HttpMethod::Post, "/models/text-embedding-004:batchEmbedContents");
    transport.verify_header(0, "x-team", "search");
    assert_eq!(
        request_body(&transport),
        json!({
            "requests": [
                {
                    "model": "models/text-embedding-004",
                    "content": {"parts": [{"text": "Hello world"}]},
                    "taskType": "SEMANTIC_SIMILARITY",
                    "outputDimensionality": 256
                },
                {
                    "model": "models/text-embedding-004",
                    "content": {"parts": [{"text": "Goodbye world"}]},
                    "taskType": "SEMANTIC_SIMILARITY",
                    "outputDimensionality": 256
                }
            ]
        })
    );
}

#[tokio::test]
async fn test_embed_returns_single_vector() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, r#"{"embeddings": [{"values": [0.5, -0.25]}]}"#);
    let model = model_with(transport.clone(), RetryConfig::no_retry());

    // Act
    let vector = model.embed("Hello world").await.unwrap();

    // Assert
    assert_eq!(vector, vec![0.5, -0.25]);
}

#[tokio::test]
async fn test_empty_response_returns_no_results() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, "{}");
    let model = model_with(transport.clone(), RetryConfig::no_retry());

    // Act
    let response = model.call(EmbeddingRequest::new(["Hello world"])).await.unwrap();
    transport.enqueue_json_response(200, "{}");
    let single = model.embed("Hello world").await;

    // Assert
    assert!(response.results.is_empty());
    assert!(single.is_err());
}

#[tokio::test]
async fn test_invalid_requests_are_rejected_before_sending() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    let model = model_with(transport.clone(), RetryConfig::no_retry());
    let too_many: Vec<String> = (0..=MAX_BATCH_SIZE).map(|i| format!("text {}", i)).collect();

    // Act
    let empty_text = model.call(EmbeddingRequest::new(["ok", ""])).await.unwrap_err();
    let oversized = model.call(EmbeddingRequest::new(too_many)).await.unwrap_err();
    let misplaced_title = model
        .call(EmbeddingRequest::new(["ok"]).with_options(EmbeddingOptions::default().with_title("Doc")))
        .await
        .unwrap_err();

    // Assert
    for error in [empty_text, oversized, misplaced_title] {
        assert!(matches!(error, GeminiError::Request(RequestError::ValidationError { .. })));
    }
    transport.verify_request_count(0);
}

#[tokio::test]
async fn test_embed_content_uses_single_endpoint() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, &load_fixture("embeddings/single_response.json"));
    let model = model_with(transport.clone(), RetryConfig::no_retry());
    let request = EmbedContentRequest {
        model: "models/text-embedding-004".to_string(),
        content: Content { role: None, parts: vec![Part::text("Hello world")] },
        task_type: Some(TaskType::RetrievalDocument),
        title: Some("Greeting".to_string()),
        output_dimensionality: None,
    };

    // Act
    let response = model.embed_content(&request).await.unwrap();

    // Assert
    assert_eq!(response.embedding.values.len(), 4);
    transport.verify_request(0, HttpMethod::Post, "/v1beta/models/text-embedding-004:embedContent");
    assert_eq!(request_body(&transport)["title"], json!("Greeting"));
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_call_is_retried() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response_with_headers(
        429,
        HashMap::from([("retry-after".to_string(), "3".to_string())]),
        &load_fixture("chat/error_429.json"),
    );
    transport.enqueue_json_response(200, &load_fixture("embeddings/batch_response.json"));
    let model = model_with(transport.clone(), RetryConfig::default().with_max_retries(1));
    let start = tokio::time::Instant::now();

    // Act
    let response = model
        .call(EmbeddingRequest::new(["Hello world", "Goodbye world"]))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.results.len(), 2);
    assert!(start.elapsed() >= Duration::from_secs(3));
    transport.verify_request_count(2);
}

#[tokio::test]
async fn test_error_status_maps_without_retry_budget() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(429, &load_fixture("chat/error_429.json"));
    let model = model_with(transport.clone(), RetryConfig::no_retry());

    // Act
    let error = model.call(EmbeddingRequest::new(["Hello world"])).await.unwrap_err();

    // Assert
    assert!(matches!(error, GeminiError::RateLimit(RateLimitError::TooManyRequests { .. })));
    transport.verify_request_count(1);
}
