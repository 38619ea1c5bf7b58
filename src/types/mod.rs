//! Core types for the Gemini chat client.
//!
//! Wire types mirror the JSON the API exchanges; domain types (`Prompt`,
//! `ChatResponse`, `Generation`, `EmbeddingResponse`, `Usage`) are what
//! callers work with.

pub mod chat;
pub mod completion;
pub mod content;
pub mod embedding;
pub mod response;
pub mod usage;

pub use chat::{ChatOptions, Message, MessageType, Prompt};
pub use completion::{
    Candidate, ChatCompletion, ChatCompletionRequest, GenerationConfig, UsageMetadata,
};
pub use content::{Content, Part, Role};
pub use embedding::{
    BatchEmbedContentsRequest, BatchEmbedContentsResponse, ContentEmbedding, EmbedContentRequest,
    EmbedContentResponse, Embedding, EmbeddingOptions, EmbeddingRequest, EmbeddingResponse,
    EmbeddingResponseMetadata, TaskType,
};
pub use response::{
    AssistantMessage, ChatResponse, ChatResponseMetadata, Generation, GenerationMetadata,
    RateLimit,
};
pub use usage::Usage;
