//! Service implementations for the Gemini API.

pub mod chat;
pub mod embeddings;

pub use chat::*;
pub use embeddings::{
    EmbeddingModel, GeminiEmbeddingModel, GeminiEmbeddingModelBuilder, DEFAULT_EMBEDDING_MODEL,
};
