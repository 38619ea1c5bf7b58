//! Error category types for granular error handling.

use std::time::Duration;
use thiserror::Error;

use super::types::GeminiError;

/// Configuration-related errors.
#[derive(Error, Debug, Clone)]
pub enum ConfigurationError {
    #[error("Missing API key")]
    MissingApiKey,

    #[error("Invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Errors reported by the API for the credentials in use.
#[derive(Error, Debug, Clone)]
pub enum AuthenticationError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },
}

/// Request construction and validation errors.
#[derive(Error, Debug, Clone)]
pub enum RequestError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Invalid model: {model}")]
    InvalidModel { model: String },

    #[error("Unsupported message type: {message_type}")]
    UnsupportedMessageType { message_type: String },

    #[error("Failed to serialize request: {message}")]
    Serialization { message: String },
}

/// Rate limiting errors.
#[derive(Error, Debug, Clone)]
pub enum RateLimitError {
    #[error("Too many requests")]
    TooManyRequests { retry_after: Option<Duration> },

    #[error("Quota exceeded")]
    QuotaExceeded { retry_after: Option<Duration> },
}

impl RateLimitError {
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            RateLimitError::TooManyRequests { retry_after }
            | RateLimitError::QuotaExceeded { retry_after } => *retry_after,
        }
    }
}

/// Network-related errors.
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Request failed: {message}")]
    RequestFailed { message: String },
}

/// Server-side errors.
#[derive(Error, Debug, Clone)]
pub enum ServerError {
    #[error("Internal server error: {message}")]
    InternalError { message: String },

    #[error("Service unavailable")]
    ServiceUnavailable { retry_after: Option<Duration> },

    #[error("Model overloaded: {model}")]
    ModelOverloaded { model: String },

    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },
}

/// Response decoding and stream aggregation errors.
#[derive(Error, Debug, Clone)]
pub enum ResponseError {
    #[error("Failed to deserialize response: {message}")]
    DeserializationError { message: String },

    #[error("Malformed chunk: {message}")]
    MalformedChunk { message: String, body: String },

    #[error(
        "Stream truncated after {chunks_received} chunk(s) without an end marker{}",
        .cause.as_ref().map(|c| format!(": {c}")).unwrap_or_default()
    )]
    TruncatedStream {
        chunks_received: usize,
        cause: Option<Box<GeminiError>>,
    },

    #[error("Unsupported role '{role}' in candidate {slot}")]
    UnsupportedRole { slot: u32, role: String },

    #[error("Unsupported content shape in candidate {slot}: {message}")]
    UnsupportedContentShape { slot: u32, message: String },
}
