//! Reqwest-based HTTP transport implementation.

use super::http::{ChunkedStream, HttpMethod, HttpRequest, HttpResponse, HttpTransport, StreamingResponse};
use super::error::TransportError;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

/// Reqwest-based HTTP transport.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new reqwest transport with the given timeouts.
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| TransportError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Convert HttpMethod to reqwest::Method.
    fn convert_method(&self, method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }

    /// Convert headers HashMap to reqwest::header::HeaderMap.
    fn convert_headers(&self, headers: HashMap<String, String>) -> reqwest::header::HeaderMap {
        let mut header_map = reqwest::header::HeaderMap::new();
        for (key, value) in headers {
            if let (Ok(name), Ok(val)) = (
                reqwest::header::HeaderName::from_bytes(key.as_bytes()),
                reqwest::header::HeaderValue::from_str(&value),
            ) {
                header_map.insert(name, val);
            }
        }
        header_map
    }

    /// Convert reqwest::header::HeaderMap to HashMap with lowercase names.
    fn extract_headers(&self, headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect()
    }

    async fn execute(&self, request: HttpRequest) -> Result<reqwest::Response, TransportError> {
        let method = self.convert_method(request.method);
        let headers = self.convert_headers(request.headers);

        let mut req_builder = self.client
            .request(method, &request.url)
            .headers(headers);

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        req_builder.send().await.map_err(map_send_error)
    }
}

fn map_send_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(Duration::ZERO)
    } else {
        TransportError::Connection(e.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = self.execute(request).await?;

        let status = response.status().as_u16();
        let response_headers = self.extract_headers(response.headers());
        let body = response.bytes().await
            .map_err(|e| TransportError::Request(format!("Failed to read response body: {}", e)))?;

        Ok(HttpResponse {
            status,
            headers: response_headers,
            body,
        })
    }

    async fn send_streaming(&self, request: HttpRequest) -> Result<StreamingResponse, TransportError> {
        let response = self.execute(request).await?;

        let status = response.status().as_u16();
        let headers = self.extract_headers(response.headers());

        if !response.status().is_success() {
            let body = response.bytes().await
                .map_err(|e| TransportError::Request(format!("Failed to read error response: {}", e)))?;
            return Err(TransportError::Status {
                status,
                headers,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let body: ChunkedStream = Box::pin(response.bytes_stream().map(|result| {
            result.map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(Duration::ZERO)
                } else {
                    TransportError::Request(format!("Stream error: {}", e))
                }
            })
        }));

        Ok(StreamingResponse { status, headers, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reqwest_transport_creation() {
        let transport = ReqwestTransport::new(
            Duration::from_secs(30),
            Duration::from_secs(10),
        );
        assert!(transport.is_ok());
    }

    #[test]
    fn test_convert_headers_skips_invalid_names() {
        let transport = ReqwestTransport::new(Duration::from_secs(1), Duration::from_secs(1)).unwrap();
        let mut headers = HashMap::new();
        headers.insert("x-goog-api-key".to_string(), "k".to_string());
        headers.insert("bad header".to_string(), "v".to_string());

        let map = transport.convert_headers(headers);

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("x-goog-api-key").unwrap(), "k");
    }
}
