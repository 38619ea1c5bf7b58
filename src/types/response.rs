//! Response-side types: generations, chat responses and their metadata.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::content::Role;
use super::usage::Usage;

/// Text produced by the model for one slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssistantMessage {
    /// The generated text.
    pub text: String,
    /// Caller-supplied and builder-supplied metadata.
    pub metadata: HashMap<String, Value>,
}

/// Per-generation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// The slot (candidate index) the generation belongs to.
    pub slot: u32,
    /// The finish reason; empty while the slot is still generating.
    pub finish_reason: String,
    /// The role reported for the slot, if any.
    pub role: Option<Role>,
}

/// One unit of generated output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Generation {
    /// The generated message.
    pub output: AssistantMessage,
    /// Metadata for this generation.
    pub metadata: GenerationMetadata,
}

impl Generation {
    /// The generated text.
    pub fn text(&self) -> &str {
        &self.output.text
    }

    /// The slot this generation belongs to.
    pub fn slot(&self) -> u32 {
        self.metadata.slot
    }

    /// The finish reason, empty when not finished.
    pub fn finish_reason(&self) -> &str {
        &self.metadata.finish_reason
    }
}

/// Rate limit information read from response headers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RateLimit {
    /// Maximum requests in the current window.
    pub requests_limit: Option<u64>,
    /// Requests left in the current window.
    pub requests_remaining: Option<u64>,
    /// When the request window resets, as sent by the server.
    pub requests_reset: Option<String>,
    /// Maximum tokens in the current window.
    pub tokens_limit: Option<u64>,
    /// Tokens left in the current window.
    pub tokens_remaining: Option<u64>,
    /// When the token window resets, as sent by the server.
    pub tokens_reset: Option<String>,
}

impl RateLimit {
    /// Returns true if no header was present.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Response-level metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatResponseMetadata {
    /// Model version that produced the response; empty when unknown.
    pub model: String,
    /// Usage so far, accumulated across turns where applicable.
    pub usage: Usage,
    /// Rate limit information, when provided out of band.
    pub rate_limit: Option<RateLimit>,
}

/// A chat response: either a per-chunk snapshot or a final response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generations, one per slot present.
    pub results: Vec<Generation>,
    /// Response-level metadata.
    pub metadata: ChatResponseMetadata,
}

impl ChatResponse {
    /// Create a response from generations and metadata.
    pub fn new(results: Vec<Generation>, metadata: ChatResponseMetadata) -> Self {
        Self { results, metadata }
    }

    /// The first generation, if any.
    pub fn result(&self) -> Option<&Generation> {
        self.results.first()
    }

    /// The generation for `slot`, if present.
    pub fn result_for_slot(&self, slot: u32) -> Option<&Generation> {
        self.results.iter().find(|g| g.metadata.slot == slot)
    }

    /// The usage recorded on this response.
    pub fn usage(&self) -> &Usage {
        &self.metadata.usage
    }
}
