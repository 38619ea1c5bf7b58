//! # Gemini Chat Client
//!
//! Rust client for Gemini chat completions, with streamed responses
//! aggregated into per-chunk snapshots and a final concatenated response,
//! plus text embeddings.
//!
//! ## Features
//!
//! - Blocking-style `call` and streamed `stream` on one [`ChatModel`] trait
//! - Both streaming wire formats: chunked JSON array and server-sent events
//! - Token usage accumulated across chunks and conversation turns
//! - Multiple candidates kept apart by slot
//! - Rate limit headers surfaced on every response
//! - Retries with exponential backoff that honour `Retry-After`
//! - Text embeddings through an [`EmbeddingModel`] trait
//! - Secure credential handling with `SecretString`
//! - Mock transport and recorded fixtures for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_gemini_chat::{ChatModel, GeminiChatModel, GeminiConfig, Prompt, StreamItem};
//! use futures::StreamExt;
//! use secrecy::SecretString;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GeminiConfig::builder()
//!         .api_key(SecretString::new("your-api-key".into()))
//!         .build()?;
//!
//!     let model = GeminiChatModel::builder().config(config).build()?;
//!
//!     let mut stream = model.stream(Prompt::from("Say hello")).await?;
//!     while let Some(item) = stream.next().await {
//!         if let StreamItem::Snapshot(snapshot) = item? {
//!             if let Some(generation) = snapshot.result() {
//!                 print!("{}", generation.text());
//!             }
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - `config` - Configuration types and builder
//! - `error` - Error types and taxonomy
//! - `observability` - Structured logging
//! - `resilience` - Retry with backoff
//! - `services` - The chat and embedding models and request creation
//! - `streaming` - Frame decoding and response aggregation
//! - `transport` - HTTP transport layer
//! - `types` - Wire and domain types

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod observability;
pub mod resilience;
pub mod services;
pub mod streaming;
pub mod transport;
pub mod types;

// Development/testing modules - always available for integration tests
pub mod mocks;
pub mod fixtures;

pub use config::{
    AuthMethod, GeminiConfig, GeminiConfigBuilder, LogLevel, StreamFormat, DEFAULT_API_VERSION,
    DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
};
pub use error::{
    // Main error types
    GeminiError,
    GeminiResult,
    // Error categories
    AuthenticationError,
    ConfigurationError,
    NetworkError,
    RateLimitError,
    RequestError,
    ResponseError,
    ServerError,
    // Error mapping utilities
    map_http_status_with_body,
};
pub use transport::{
    ChunkedStream, HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport,
    StreamingResponse, TransportError,
};

pub use types::{
    // Content types
    Content, Part, Role,
    // Embedding types
    EmbedContentRequest, Embedding, EmbeddingOptions, EmbeddingRequest, EmbeddingResponse,
    EmbeddingResponseMetadata, TaskType,
    // Prompt types
    ChatOptions, Message, MessageType, Prompt,
    // Wire types
    Candidate, ChatCompletion, ChatCompletionRequest, GenerationConfig, UsageMetadata,
    // Response types
    AssistantMessage, ChatResponse, ChatResponseMetadata, Generation, GenerationMetadata,
    RateLimit, Usage,
};

pub use services::{
    ChatModel, ChatResponseStream, EmbeddingModel, GeminiChatModel, GeminiChatModelBuilder,
    GeminiEmbeddingModel, GeminiEmbeddingModelBuilder, DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL,
    DEFAULT_TEMPERATURE,
};

pub use resilience::{RetryConfig, RetryExecutor};

pub use streaming::{
    AggregationOptions, MessageConcatenator, ResponseAggregator, StreamFrame, StreamItem,
};

pub use observability::{DefaultLogger, Logger, NoopLogger, StructuredLogger};
