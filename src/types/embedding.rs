//! Embedding types for the Gemini API.
//!
//! The wire types mirror `embedContent` and `batchEmbedContents`;
//! [`EmbeddingRequest`] and [`EmbeddingResponse`] are what callers of the
//! embedding model work with.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::content::Content;
use super::usage::Usage;

/// Task types for embeddings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// Retrieval query task.
    RetrievalQuery,
    /// Retrieval document task.
    RetrievalDocument,
    /// Semantic similarity task.
    SemanticSimilarity,
    /// Classification task.
    Classification,
    /// Clustering task.
    Clustering,
    /// Question answering task.
    QuestionAnswering,
    /// Fact verification task.
    FactVerification,
}

/// Request to embed one content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentRequest {
    /// The model resource name, `models/{model}`.
    pub model: String,
    /// The content to embed.
    pub content: Content,
    /// The task type for the embedding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    /// The title for retrieval documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Truncate the embedding to this many dimensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dimensionality: Option<u32>,
}

/// Request body of `batchEmbedContents`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchEmbedContentsRequest {
    /// One request per input, in order.
    pub requests: Vec<EmbedContentRequest>,
}

/// An embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ContentEmbedding {
    /// The embedding values.
    #[serde(default)]
    pub values: Vec<f32>,
}

/// Response from `embedContent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedContentResponse {
    /// The embedding.
    pub embedding: ContentEmbedding,
}

/// Response from `batchEmbedContents`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BatchEmbedContentsResponse {
    /// The embeddings, in request order.
    #[serde(default)]
    pub embeddings: Vec<ContentEmbedding>,
}

/// Options for an embedding request. Unset fields fall back to the
/// model's defaults.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmbeddingOptions {
    /// The embedding model.
    pub model: Option<String>,
    /// Output dimensionality.
    pub dimensions: Option<u32>,
    /// Task type.
    pub task_type: Option<TaskType>,
    /// Title, only valid for [`TaskType::RetrievalDocument`].
    pub title: Option<String>,
    /// Extra HTTP headers sent with the request.
    pub http_headers: HashMap<String, String>,
}

impl EmbeddingOptions {
    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the output dimensionality.
    pub fn with_dimensions(mut self, dimensions: u32) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Set the task type.
    pub fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add an HTTP header.
    pub fn with_http_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.http_headers.insert(name.into(), value.into());
        self
    }
}

/// Texts to embed plus optional runtime options.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmbeddingRequest {
    /// The texts, one embedding each.
    pub inputs: Vec<String>,
    /// Runtime options overriding the model defaults.
    pub options: Option<EmbeddingOptions>,
}

impl EmbeddingRequest {
    /// Create a request without runtime options.
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            options: None,
        }
    }

    /// Attach runtime options.
    pub fn with_options(mut self, options: EmbeddingOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// The embedding of one input.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Embedding {
    /// Position of the input in the request.
    pub index: usize,
    /// The embedding values.
    pub output: Vec<f32>,
}

/// Metadata of an embedding response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmbeddingResponseMetadata {
    /// The model that produced the embeddings.
    pub model: String,
    /// Token usage. The embedding endpoints report none, so this is
    /// normally [`Usage::empty`].
    pub usage: Usage,
}

/// Embeddings for every input of a request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmbeddingResponse {
    /// One embedding per input, in input order.
    pub results: Vec<Embedding>,
    /// Response metadata.
    pub metadata: EmbeddingResponseMetadata,
}

impl EmbeddingResponse {
    /// The first embedding, if any.
    pub fn result(&self) -> Option<&Embedding> {
        self.results.first()
    }
}
