//! Wire types for `generateContent` and `streamGenerateContent`.

use serde::{Deserialize, Serialize};

use super::content::Content;

/// Configuration for content generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// The temperature for sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// The nucleus sampling probability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// The top-k sampling parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// The maximum number of tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Sequences that will stop generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    /// The number of candidates to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<u32>,
}

impl GenerationConfig {
    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Request body for chat completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatCompletionRequest {
    /// The conversation so far.
    pub contents: Vec<Content>,
    /// Generation configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    /// Model the request targets. Sent in the URL, not the body.
    #[serde(skip)]
    pub model: String,
    /// Whether the request is for the streaming endpoint.
    #[serde(skip)]
    pub stream: bool,
}

/// Token usage counters as reported by the API.
///
/// Every counter is optional; the streaming endpoint often reports usage on
/// the last chunk only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Number of tokens in the prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_token_count: Option<u32>,
    /// Number of tokens in the candidates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates_token_count: Option<u32>,
    /// Total number of tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_token_count: Option<u32>,
    /// Number of tokens from cached content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_content_token_count: Option<u32>,
    /// Number of tokens spent on thinking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thoughts_token_count: Option<u32>,
}

/// One candidate (slot) in a completion or streaming chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The content of the candidate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// The reason generation finished, as sent by the API.
    #[serde(skip_serializing_if = "Option::is_none", alias = "finish_reason")]
    pub finish_reason: Option<String>,
    /// The index of this candidate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

/// A completion response, or one chunk of a streamed completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatCompletion {
    /// The candidate responses.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Usage metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
    /// The version of the model used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    /// Identifier of the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
}
