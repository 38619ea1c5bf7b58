//! Main error type for the Gemini chat client.

use std::time::Duration;
use thiserror::Error;
use super::categories::*;
use bytes::Bytes;
use crate::transport::{HttpResponse, ResponseParser, TransportError};

/// Result type alias for Gemini operations.
pub type GeminiResult<T> = Result<T, GeminiError>;

/// Top-level error type for the Gemini chat integration.
#[derive(Error, Debug, Clone)]
pub enum GeminiError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    #[error("Rate limit error: {0}")]
    RateLimit(#[from] RateLimitError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Response error: {0}")]
    Response(#[from] ResponseError),
}

impl GeminiError {
    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GeminiError::RateLimit(_)
                | GeminiError::Network(NetworkError::Timeout { .. })
                | GeminiError::Network(NetworkError::ConnectionFailed { .. })
                | GeminiError::Server(ServerError::ServiceUnavailable { .. })
                | GeminiError::Server(ServerError::ModelOverloaded { .. })
        )
    }

    /// Returns the retry-after duration if available.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GeminiError::RateLimit(e) => e.retry_after(),
            GeminiError::Server(ServerError::ServiceUnavailable { retry_after }) => *retry_after,
            _ => None,
        }
    }

    /// Returns true if a stream ended before its end-of-stream sentinel.
    pub fn is_truncated_stream(&self) -> bool {
        matches!(self, GeminiError::Response(ResponseError::TruncatedStream { .. }))
    }

    /// Returns true if a stream frame could not be decoded.
    pub fn is_malformed_chunk(&self) -> bool {
        matches!(self, GeminiError::Response(ResponseError::MalformedChunk { .. }))
    }

    /// Wraps a mid-stream failure as a truncation after `chunks_received` chunks.
    pub(crate) fn truncated(chunks_received: usize, cause: Option<GeminiError>) -> Self {
        GeminiError::Response(ResponseError::TruncatedStream {
            chunks_received,
            cause: cause.map(Box::new),
        })
    }
}

impl From<reqwest::Error> for GeminiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GeminiError::Network(NetworkError::Timeout {
                duration: Duration::from_secs(0), // Unknown actual duration
            })
        } else {
            GeminiError::Network(NetworkError::ConnectionFailed {
                message: err.to_string(),
            })
        }
    }
}

impl From<serde_json::Error> for GeminiError {
    fn from(err: serde_json::Error) -> Self {
        GeminiError::Response(ResponseError::DeserializationError {
            message: err.to_string(),
        })
    }
}

impl From<url::ParseError> for GeminiError {
    fn from(err: url::ParseError) -> Self {
        GeminiError::Configuration(ConfigurationError::InvalidBaseUrl {
            url: err.to_string(),
        })
    }
}

impl From<TransportError> for GeminiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Connection(message) => {
                GeminiError::Network(NetworkError::ConnectionFailed { message })
            }
            TransportError::Timeout(duration) => {
                GeminiError::Network(NetworkError::Timeout { duration })
            }
            TransportError::Request(message) => {
                GeminiError::Network(NetworkError::RequestFailed { message })
            }
            TransportError::Status { status, headers, body } => {
                ResponseParser::parse_error_response(HttpResponse {
                    status,
                    headers,
                    body: Bytes::from(body),
                })
            }
        }
    }
}
