//! Chat model backed by `generateContent` and `streamGenerateContent`.

mod request;
mod service;

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::error::GeminiResult;
use crate::streaming::StreamItem;
use crate::types::{ChatResponse, Prompt};

pub use request::{
    build_request_prompt, create_request, merge_options, DEFAULT_CHAT_MODEL, DEFAULT_TEMPERATURE,
};
pub use service::{GeminiChatModel, GeminiChatModelBuilder};

/// Type alias for a streamed chat response.
pub type ChatResponseStream = Pin<Box<dyn Stream<Item = GeminiResult<StreamItem>> + Send>>;

/// A chat model answering prompts, either at once or streamed.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the prompt and wait for the whole response.
    async fn call(&self, prompt: Prompt) -> GeminiResult<ChatResponse>;

    /// Send the prompt and stream the response.
    ///
    /// Errors raised before the response body starts (request building,
    /// HTTP status) are returned directly; failures while streaming are
    /// items of the stream.
    async fn stream(&self, prompt: Prompt) -> GeminiResult<ChatResponseStream>;
}
