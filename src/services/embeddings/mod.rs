//! Embedding model backed by `embedContent` and `batchEmbedContents`.

mod service;
mod validation;

use async_trait::async_trait;

use crate::error::{GeminiResult, ResponseError};
use crate::types::{EmbeddingRequest, EmbeddingResponse};

pub use service::{
    create_requests, merge_embedding_options, GeminiEmbeddingModel, GeminiEmbeddingModelBuilder,
    DEFAULT_EMBEDDING_MODEL,
};
pub use validation::{
    validate_batch_size, validate_embed_request, MAX_BATCH_SIZE, MAX_OUTPUT_DIMENSIONALITY,
};

/// A model turning texts into embedding vectors.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Embed every input of the request.
    async fn call(&self, request: EmbeddingRequest) -> GeminiResult<EmbeddingResponse>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> GeminiResult<Vec<f32>> {
        let response = self.call(EmbeddingRequest::new([text])).await?;
        response
            .results
            .into_iter()
            .next()
            .map(|embedding| embedding.output)
            .ok_or_else(|| {
                ResponseError::DeserializationError {
                    message: "no embedding returned".to_string(),
                }
                .into()
            })
    }
}
