//! Core HTTP transport abstractions for the Gemini chat client.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;

use super::error::TransportError;

/// HTTP request for the transport layer.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request URL.
    pub url: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<Bytes>,
}

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// HTTP response from the transport layer.
#[derive(Debug)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Bytes,
}

/// Chunked stream for streaming responses.
pub type ChunkedStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// A successful streaming response: status and headers are known, the body
/// is still arriving.
pub struct StreamingResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body, read incrementally.
    pub body: ChunkedStream,
}

impl fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// HTTP transport abstraction for testability.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request and receive a response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Send a streaming request and receive the response headers plus a
    /// chunked body.
    ///
    /// A non-success status is reported as [`TransportError::Status`] with
    /// the whole error body read.
    async fn send_streaming(&self, request: HttpRequest) -> Result<StreamingResponse, TransportError>;
}
