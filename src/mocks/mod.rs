//! Mock implementations for testing.
//!
//! [`MockHttpTransport`] replays queued responses and records every request,
//! so the chat model can be exercised without a network.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, StreamingResponse, TransportError,
};

type QueuedStream = Result<(HashMap<String, String>, Vec<Result<Bytes, TransportError>>), TransportError>;

/// Mock HTTP transport for testing.
///
/// # Example
///
/// ```
/// use integrations_gemini_chat::mocks::MockHttpTransport;
/// use integrations_gemini_chat::transport::{HttpMethod, HttpRequest, HttpTransport};
/// use std::collections::HashMap;
///
/// # tokio_test::block_on(async {
/// let transport = MockHttpTransport::new();
/// transport.enqueue_json_response(200, r#"{"candidates": []}"#);
///
/// let request = HttpRequest {
///     method: HttpMethod::Post,
///     url: "https://example.com".to_string(),
///     headers: HashMap::new(),
///     body: None,
/// };
///
/// let response = transport.send(request).await.unwrap();
/// assert_eq!(response.status, 200);
/// transport.verify_request_count(1);
/// # });
/// ```
pub struct MockHttpTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
    streaming_responses: Arc<Mutex<VecDeque<QueuedStream>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockHttpTransport {
    /// Create a new mock HTTP transport.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            streaming_responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Enqueue a response to be returned by the next `send`.
    pub fn enqueue_response(&self, response: Result<HttpResponse, TransportError>) {
        lock(&self.responses).push_back(response);
    }

    /// Enqueue a JSON response with the given status code and body.
    pub fn enqueue_json_response(&self, status: u16, body: &str) {
        self.enqueue_json_response_with_headers(status, HashMap::new(), body);
    }

    /// Enqueue a JSON response with extra headers.
    pub fn enqueue_json_response_with_headers(
        &self,
        status: u16,
        mut headers: HashMap<String, String>,
        body: &str,
    ) {
        headers.insert("content-type".to_string(), "application/json".to_string());
        self.enqueue_response(Ok(HttpResponse {
            status,
            headers,
            body: Bytes::from(body.to_string()),
        }));
    }

    /// Enqueue an error for the next `send`.
    pub fn enqueue_error(&self, error: TransportError) {
        self.enqueue_response(Err(error));
    }

    /// Enqueue a streaming response delivering `chunks` one read at a time.
    pub fn enqueue_streaming_response(&self, chunks: Vec<Bytes>) {
        self.enqueue_streaming_response_with_headers(HashMap::new(), chunks);
    }

    /// Enqueue a streaming response with headers.
    pub fn enqueue_streaming_response_with_headers(
        &self,
        headers: HashMap<String, String>,
        chunks: Vec<Bytes>,
    ) {
        self.enqueue_streaming_reads(headers, chunks.into_iter().map(Ok).collect());
    }

    /// Enqueue a streaming response whose reads may fail part way.
    pub fn enqueue_streaming_reads(
        &self,
        headers: HashMap<String, String>,
        reads: Vec<Result<Bytes, TransportError>>,
    ) {
        lock(&self.streaming_responses).push_back(Ok((headers, reads)));
    }

    /// Enqueue an error for the next `send_streaming`.
    pub fn enqueue_streaming_error(&self, error: TransportError) {
        lock(&self.streaming_responses).push_back(Err(error));
    }

    /// Get all requests that were made.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Get the last request that was made.
    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Verify that exactly `expected` requests were made.
    pub fn verify_request_count(&self, expected: usize) {
        let actual = lock(&self.requests).len();
        assert_eq!(actual, expected, "Expected {} requests, got {}", expected, actual);
    }

    /// Verify that a request was made with the expected method and URL.
    pub fn verify_request(&self, index: usize, method: HttpMethod, url_contains: &str) {
        let requests = lock(&self.requests);
        assert!(index < requests.len(), "No request at index {}", index);

        let request = &requests[index];
        assert_eq!(request.method, method, "Expected method {:?}, got {:?}", method, request.method);
        assert!(
            request.url.contains(url_contains),
            "Expected URL to contain '{}', got '{}'",
            url_contains,
            request.url
        );
    }

    /// Verify that a request carries a header with the given value.
    pub fn verify_header(&self, index: usize, header_name: &str, header_value: &str) {
        let requests = lock(&self.requests);
        assert!(index < requests.len(), "No request at index {}", index);

        let actual_value = requests[index].headers.get(header_name);
        assert_eq!(
            actual_value,
            Some(&header_value.to_string()),
            "Expected header '{}' to be '{}', got {:?}",
            header_name,
            header_value,
            actual_value
        );
    }
}

impl Default for MockHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        lock(&self.requests).push(request);

        lock(&self.responses).pop_front().unwrap_or_else(|| {
            Err(TransportError::Connection(
                "No response configured in MockHttpTransport".to_string(),
            ))
        })
    }

    async fn send_streaming(&self, request: HttpRequest) -> Result<StreamingResponse, TransportError> {
        lock(&self.requests).push(request);

        let (headers, reads) = lock(&self.streaming_responses).pop_front().unwrap_or_else(|| {
            Err(TransportError::Connection(
                "No streaming response configured in MockHttpTransport".to_string(),
            ))
        })?;

        Ok(StreamingResponse {
            status: 200,
            headers,
            body: Box::pin(stream::iter(reads)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: "https://example.com/v1beta/models/m:generateContent".to_string(),
            headers: HashMap::from([("x-goog-api-key".to_string(), "k".to_string())]),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_replays_queued_responses_in_order() {
        let transport = MockHttpTransport::new();
        transport.enqueue_json_response(200, "{}");
        transport.enqueue_error(TransportError::Connection("down".to_string()));

        assert_eq!(transport.send(request()).await.unwrap().status, 200);
        assert!(transport.send(request()).await.is_err());
        assert!(transport.send(request()).await.is_err());

        transport.verify_request_count(3);
        transport.verify_request(0, HttpMethod::Post, "generateContent");
        transport.verify_header(0, "x-goog-api-key", "k");
    }

    #[tokio::test]
    async fn test_streaming_reads_are_replayed() {
        let transport = MockHttpTransport::new();
        transport.enqueue_streaming_reads(
            HashMap::new(),
            vec![
                Ok(Bytes::from_static(b"[")),
                Err(TransportError::Connection("reset".to_string())),
            ],
        );

        let response = transport.send_streaming(request()).await.unwrap();
        let reads: Vec<_> = response.body.collect().await;

        assert_eq!(reads.len(), 2);
        assert!(reads[0].is_ok());
        assert!(reads[1].is_err());
        assert!(transport.send_streaming(request()).await.is_err());
    }
}
