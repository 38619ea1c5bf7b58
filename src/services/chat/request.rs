//! Request creation and option merging for the chat model.

use crate::error::{GeminiError, GeminiResult, RequestError};
use crate::types::{
    ChatCompletionRequest, ChatOptions, Content, GenerationConfig, MessageType, Prompt, Role,
};

/// Model used when neither the defaults nor the prompt name one.
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.0-flash";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Merge runtime options over defaults, field by field.
///
/// HTTP headers are merged too: runtime headers override default headers
/// with the same name, all others are kept.
pub fn merge_options(runtime: Option<&ChatOptions>, defaults: &ChatOptions) -> ChatOptions {
    let Some(runtime) = runtime else {
        return defaults.clone();
    };

    let mut http_headers = defaults.http_headers.clone();
    http_headers.extend(runtime.http_headers.iter().map(|(k, v)| (k.clone(), v.clone())));

    ChatOptions {
        model: runtime.model.clone().or_else(|| defaults.model.clone()),
        temperature: runtime.temperature.or(defaults.temperature),
        top_p: runtime.top_p.or(defaults.top_p),
        top_k: runtime.top_k.or(defaults.top_k),
        max_output_tokens: runtime.max_output_tokens.or(defaults.max_output_tokens),
        stop_sequences: runtime.stop_sequences.clone().or_else(|| defaults.stop_sequences.clone()),
        candidate_count: runtime.candidate_count.or(defaults.candidate_count),
        http_headers,
    }
}

/// The prompt with its options merged over `defaults`.
pub fn build_request_prompt(prompt: &Prompt, defaults: &ChatOptions) -> Prompt {
    Prompt {
        messages: prompt.messages.clone(),
        options: Some(merge_options(prompt.options.as_ref(), defaults)),
    }
}

/// Build the wire request for a prompt whose options are already merged.
///
/// User messages are sent with the `user` role; assistant and system
/// messages with the `model` role.
///
/// # Errors
///
/// `UnsupportedMessageType` for tool messages, `ValidationError` for an
/// empty prompt or out-of-range options.
pub fn create_request(prompt: &Prompt, stream: bool) -> GeminiResult<ChatCompletionRequest> {
    if prompt.messages.is_empty() {
        return Err(validation("prompt must contain at least one message"));
    }

    let contents = prompt
        .messages
        .iter()
        .map(|message| {
            let role = match message.message_type {
                MessageType::User => Role::User,
                MessageType::Assistant | MessageType::System => Role::Model,
                MessageType::Tool => {
                    return Err(GeminiError::Request(RequestError::UnsupportedMessageType {
                        message_type: message.message_type.to_string(),
                    }))
                }
            };
            Ok(Content::text(role, message.text.clone()))
        })
        .collect::<GeminiResult<Vec<_>>>()?;

    let options = prompt.options.clone().unwrap_or_default();
    validate_options(&options)?;

    let generation_config = GenerationConfig {
        temperature: options.temperature,
        top_p: options.top_p,
        top_k: options.top_k,
        max_output_tokens: options.max_output_tokens,
        stop_sequences: options.stop_sequences,
        candidate_count: options.candidate_count,
    };

    Ok(ChatCompletionRequest {
        contents,
        generation_config: (!generation_config.is_empty()).then_some(generation_config),
        model: options.model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
        stream,
    })
}

fn validate_options(options: &ChatOptions) -> GeminiResult<()> {
    if let Some(temperature) = options.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(validation(format!("temperature must be between 0.0 and 2.0, got {}", temperature)));
        }
    }
    if let Some(top_p) = options.top_p {
        if !(0.0..=1.0).contains(&top_p) {
            return Err(validation(format!("top_p must be between 0.0 and 1.0, got {}", top_p)));
        }
    }
    if options.candidate_count == Some(0) {
        return Err(validation("candidate_count must be at least 1"));
    }
    if options.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
        return Err(validation("model must not be empty"));
    }
    Ok(())
}

fn validation(message: impl Into<String>) -> GeminiError {
    GeminiError::Request(RequestError::ValidationError {
        message: message.into(),
    })
}
