//! HTTP response parser for the Gemini API.
//!
//! This module provides the `ResponseParser` for parsing HTTP responses,
//! mapping error statuses, and reading metadata headers such as retry-after
//! and rate limits.

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{map_http_status_with_body, GeminiError, RateLimitError, ServerError};
use crate::types::RateLimit;
use super::http::HttpResponse;

/// Parser for HTTP responses from the Gemini API.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses a successful HTTP response into the expected type.
    ///
    /// # Example
    ///
    /// ```
    /// use integrations_gemini_chat::transport::{ResponseParser, HttpResponse};
    /// use bytes::Bytes;
    /// use serde::Deserialize;
    /// use std::collections::HashMap;
    ///
    /// #[derive(Deserialize)]
    /// struct ModelResponse {
    ///     name: String,
    /// }
    ///
    /// let response = HttpResponse {
    ///     status: 200,
    ///     headers: HashMap::new(),
    ///     body: Bytes::from(r#"{"name":"gemini-2.0-flash"}"#),
    /// };
    ///
    /// let parsed: ModelResponse = ResponseParser::parse_response(response).unwrap();
    /// assert_eq!(parsed.name, "gemini-2.0-flash");
    /// ```
    pub fn parse_response<T: DeserializeOwned>(response: HttpResponse) -> Result<T, GeminiError> {
        if (200..300).contains(&response.status) {
            let parsed: T = serde_json::from_slice(&response.body)?;
            Ok(parsed)
        } else {
            Err(Self::parse_error_response(response))
        }
    }

    /// Passes a successful response through and maps any other status to
    /// its `GeminiError`.
    ///
    /// # Arguments
    ///
    /// * `response` - The response as returned by the transport
    ///
    /// # Example
    ///
    /// ```
    /// use integrations_gemini_chat::transport::{ResponseParser, HttpResponse};
    /// use bytes::Bytes;
    /// use std::collections::HashMap;
    ///
    /// let response = HttpResponse {
    ///     status: 503,
    ///     headers: HashMap::from([("retry-after".to_string(), "5".to_string())]),
    ///     body: Bytes::from(r#"{"error":{"code":503,"message":"busy","status":"UNAVAILABLE"}}"#),
    /// };
    ///
    /// let error = ResponseParser::check_status(response).unwrap_err();
    /// assert!(error.is_retryable());
    /// ```
    pub fn check_status(response: HttpResponse) -> Result<HttpResponse, GeminiError> {
        if (200..300).contains(&response.status) {
            Ok(response)
        } else {
            Err(Self::parse_error_response(response))
        }
    }

    /// Maps an error response to a `GeminiError`, filling in the
    /// retry-after delay from the headers when the status carries one.
    ///
    /// # Arguments
    ///
    /// * `response` - A response with a non-success status
    ///
    /// # Example
    ///
    /// ```
    /// use integrations_gemini_chat::transport::{ResponseParser, HttpResponse};
    /// use bytes::Bytes;
    /// use std::collections::HashMap;
    /// use std::time::Duration;
    ///
    /// let response = HttpResponse {
    ///     status: 429,
    ///     headers: HashMap::from([("retry-after".to_string(), "30".to_string())]),
    ///     body: Bytes::from(r#"{"error":{"code":429,"message":"Slow down","status":"RESOURCE_EXHAUSTED"}}"#),
    /// };
    ///
    /// let error = ResponseParser::parse_error_response(response);
    /// assert_eq!(error.retry_after(), Some(Duration::from_secs(30)));
    /// ```
    pub fn parse_error_response(response: HttpResponse) -> GeminiError {
        let retry_after = Self::parse_retry_after(&response.headers);
        let request_id = Self::extract_request_id(&response.headers);

        let mut error = map_http_status_with_body(response.status, &response.body);

        match &mut error {
            GeminiError::RateLimit(RateLimitError::TooManyRequests { retry_after: ra })
            | GeminiError::RateLimit(RateLimitError::QuotaExceeded { retry_after: ra })
            | GeminiError::Server(ServerError::ServiceUnavailable { retry_after: ra }) => {
                if retry_after.is_some() {
                    *ra = retry_after;
                }
            }
            _ => {}
        }

        if let Some(ref id) = request_id {
            tracing::debug!(
                request_id = %id,
                status = response.status,
                error = ?error,
                "API error occurred"
            );
        }

        error
    }

    /// Parses the Retry-After header (delay in seconds).
    ///
    /// ```
    /// use integrations_gemini_chat::transport::ResponseParser;
    /// use std::collections::HashMap;
    /// use std::time::Duration;
    ///
    /// let mut headers = HashMap::new();
    /// headers.insert("retry-after".to_string(), "60".to_string());
    ///
    /// assert_eq!(ResponseParser::parse_retry_after(&headers), Some(Duration::from_secs(60)));
    /// ```
    pub fn parse_retry_after(headers: &HashMap<String, String>) -> Option<Duration> {
        header_value(headers, "retry-after")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    /// Extracts the request ID from response headers for debugging.
    pub fn extract_request_id(headers: &HashMap<String, String>) -> Option<String> {
        ["x-request-id", "x-goog-request-id", "request-id"]
            .iter()
            .find_map(|name| header_value(headers, name))
            .map(str::to_string)
    }

    /// Reads rate limit information from `x-ratelimit-*` headers.
    ///
    /// Returns `None` when none of the headers is present. Unparseable
    /// numeric values are ignored.
    ///
    /// # Arguments
    ///
    /// * `headers` - Response headers; names are matched case-insensitively
    ///
    /// # Example
    ///
    /// ```
    /// use integrations_gemini_chat::transport::ResponseParser;
    /// use std::collections::HashMap;
    ///
    /// let headers = HashMap::from([
    ///     ("x-ratelimit-limit-requests".to_string(), "60".to_string()),
    ///     ("x-ratelimit-remaining-requests".to_string(), "59".to_string()),
    /// ]);
    ///
    /// let rate_limit = ResponseParser::extract_rate_limit(&headers).unwrap();
    /// assert_eq!(rate_limit.requests_remaining, Some(59));
    /// ```
    pub fn extract_rate_limit(headers: &HashMap<String, String>) -> Option<RateLimit> {
        let rate_limit = RateLimit {
            requests_limit: parse_header(headers, "x-ratelimit-limit-requests"),
            requests_remaining: parse_header(headers, "x-ratelimit-remaining-requests"),
            requests_reset: header_value(headers, "x-ratelimit-reset-requests").map(str::to_string),
            tokens_limit: parse_header(headers, "x-ratelimit-limit-tokens"),
            tokens_remaining: parse_header(headers, "x-ratelimit-remaining-tokens"),
            tokens_reset: header_value(headers, "x-ratelimit-reset-tokens").map(str::to_string),
        };

        if rate_limit.is_empty() {
            None
        } else {
            Some(rate_limit)
        }
    }
}

/// Case-insensitive header lookup.
fn header_value<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

fn parse_header<T: FromStr>(headers: &HashMap<String, String>, name: &str) -> Option<T> {
    header_value(headers, name).and_then(|value| value.trim().parse().ok())
}
