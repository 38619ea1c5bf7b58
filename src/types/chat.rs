//! Prompt-side types: messages, prompts and chat options.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::response::AssistantMessage;

/// The kind of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Message written by the user.
    User,
    /// Earlier output of the model.
    Assistant,
    /// System instruction.
    System,
    /// Result of a tool invocation.
    Tool,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageType::User => "user",
            MessageType::Assistant => "assistant",
            MessageType::System => "system",
            MessageType::Tool => "tool",
        };
        f.write_str(name)
    }
}

/// One message of a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The kind of message.
    pub message_type: MessageType,
    /// The message text.
    pub text: String,
}

impl Message {
    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self { message_type: MessageType::User, text: text.into() }
    }

    /// Create an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self { message_type: MessageType::Assistant, text: text.into() }
    }

    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self { message_type: MessageType::System, text: text.into() }
    }

    /// Create a tool message.
    pub fn tool(text: impl Into<String>) -> Self {
        Self { message_type: MessageType::Tool, text: text.into() }
    }
}

impl From<&AssistantMessage> for Message {
    fn from(message: &AssistantMessage) -> Self {
        Message::assistant(message.text.clone())
    }
}

/// Options for a chat request.
///
/// Every field is optional so that runtime options can be merged over the
/// model's defaults field by field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatOptions {
    /// Model name, e.g. `gemini-2.0-flash`.
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Nucleus sampling probability.
    pub top_p: Option<f64>,
    /// Top-k sampling.
    pub top_k: Option<u32>,
    /// Maximum number of output tokens.
    pub max_output_tokens: Option<u32>,
    /// Stop sequences.
    pub stop_sequences: Option<Vec<String>>,
    /// Number of candidates to generate.
    pub candidate_count: Option<u32>,
    /// Extra HTTP headers sent with the request.
    #[serde(skip)]
    pub http_headers: HashMap<String, String>,
}

impl ChatOptions {
    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set top-p.
    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set top-k.
    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Set the maximum number of output tokens.
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    /// Set the number of candidates.
    pub fn with_candidate_count(mut self, candidate_count: u32) -> Self {
        self.candidate_count = Some(candidate_count);
        self
    }

    /// Add an HTTP header.
    pub fn with_http_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.http_headers.insert(name.into(), value.into());
        self
    }
}

/// A prompt: the ordered messages plus optional runtime options.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Prompt {
    /// The messages, oldest first.
    pub messages: Vec<Message>,
    /// Runtime options overriding the model defaults.
    pub options: Option<ChatOptions>,
}

impl Prompt {
    /// Create a prompt without runtime options.
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages, options: None }
    }

    /// Attach runtime options.
    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = Some(options);
        self
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Prompt::new(vec![Message::user(text)])
    }
}
