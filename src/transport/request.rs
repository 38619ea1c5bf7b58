//! HTTP request builder for the Gemini API.
//!
//! This module provides the `RequestBuilder` for constructing HTTP requests
//! with the API key, headers, and URL formatting.

use bytes::Bytes;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::collections::HashMap;
use url::Url;

use crate::config::{AuthMethod, GeminiConfig};
use crate::error::GeminiError;
use super::http::{HttpMethod, HttpRequest};

/// Header carrying the API key when [`AuthMethod::Header`] is used.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Query parameter carrying the API key when [`AuthMethod::QueryParam`] is used.
pub const API_KEY_QUERY_PARAM: &str = "key";

/// Builder for constructing HTTP requests to the Gemini API.
///
/// The `RequestBuilder` handles:
/// - URL construction with API version prefixes
/// - The API key, as a header or query parameter
/// - Header management (Content-Type, custom headers)
/// - Request body serialization
#[derive(Clone)]
pub struct RequestBuilder {
    base_url: Url,
    api_version: String,
    api_key: SecretString,
    auth_method: AuthMethod,
}

impl RequestBuilder {
    /// Creates a request builder from explicit parts.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL for the API
    /// * `api_version` - The API version to use (e.g., "v1beta")
    /// * `api_key` - The API key
    /// * `auth_method` - Whether the key travels as a header or query parameter
    pub fn new(
        base_url: Url,
        api_version: String,
        api_key: SecretString,
        auth_method: AuthMethod,
    ) -> Self {
        Self {
            base_url,
            api_version,
            api_key,
            auth_method,
        }
    }

    /// Creates a request builder from a client configuration.
    pub fn from_config(config: &GeminiConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            config.api_version.clone(),
            config.api_key.clone(),
            config.auth_method,
        )
    }

    /// Builds a complete URL for the given path.
    ///
    /// The API version is prepended to the path, `query` is appended and,
    /// with query-parameter auth, the API key is added last.
    ///
    /// # Arguments
    ///
    /// * `path` - The endpoint path (e.g., "/models/gemini-2.0-flash:generateContent")
    /// * `query` - Extra query pairs, in order
    ///
    /// # Example
    ///
    /// ```
    /// # use integrations_gemini_chat::config::{AuthMethod, GeminiConfig};
    /// # use integrations_gemini_chat::transport::RequestBuilder;
    /// # use secrecy::SecretString;
    /// let config = GeminiConfig::builder()
    ///     .api_key(SecretString::new("test-key".into()))
    ///     .auth_method(AuthMethod::QueryParam)
    ///     .build()
    ///     .unwrap();
    /// let builder = RequestBuilder::from_config(&config);
    ///
    /// let url = builder
    ///     .build_url("/models/gemini-2.0-flash:streamGenerateContent", &[("alt", "sse")])
    ///     .unwrap();
    /// assert_eq!(
    ///     url.as_str(),
    ///     "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:streamGenerateContent?alt=sse&key=test-key"
    /// );
    /// ```
    pub fn build_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, GeminiError> {
        let path = path.trim_start_matches('/');
        let full_path = format!("{}/{}", self.api_version, path);
        let mut url = self.base_url.join(&full_path)?;

        if !query.is_empty() || self.auth_method == AuthMethod::QueryParam {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            if self.auth_method == AuthMethod::QueryParam {
                pairs.append_pair(API_KEY_QUERY_PARAM, self.api_key.expose_secret());
            }
        }

        Ok(url)
    }

    /// Builds an HTTP request with the given parameters.
    ///
    /// The body, when present, is serialized to JSON. `extra_headers` are
    /// merged last and override the defaults.
    ///
    /// # Arguments
    ///
    /// * `method` - The HTTP method
    /// * `path` - The endpoint path
    /// * `query` - Extra query pairs
    /// * `body` - Optional request body (will be serialized to JSON)
    /// * `extra_headers` - Optional additional headers
    ///
    /// # Example
    ///
    /// ```
    /// # use integrations_gemini_chat::config::GeminiConfig;
    /// # use integrations_gemini_chat::transport::{HttpMethod, RequestBuilder};
    /// # use secrecy::SecretString;
    /// # use std::collections::HashMap;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct EchoRequest {
    ///     prompt: String,
    /// }
    ///
    /// # let config = GeminiConfig::builder()
    /// #     .api_key(SecretString::new("test-key".into()))
    /// #     .build()
    /// #     .unwrap();
    /// let builder = RequestBuilder::from_config(&config);
    /// let body = EchoRequest { prompt: "Hello".to_string() };
    ///
    /// let request = builder
    ///     .build_request(
    ///         HttpMethod::Post,
    ///         "/models/gemini-2.0-flash:generateContent",
    ///         &[],
    ///         Some(&body),
    ///         Some(HashMap::from([("x-team".to_string(), "search".to_string())])),
    ///     )
    ///     .unwrap();
    ///
    /// assert_eq!(request.headers["x-goog-api-key"], "test-key");
    /// assert_eq!(request.headers["x-team"], "search");
    /// assert_eq!(request.body.unwrap().as_ref(), br#"{"prompt":"Hello"}"#);
    /// ```
    pub fn build_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&T>,
        extra_headers: Option<HashMap<String, String>>,
    ) -> Result<HttpRequest, GeminiError> {
        let url = self.build_url(path, query)?;

        let mut headers = HashMap::new();

        if body.is_some() {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }

        if self.auth_method == AuthMethod::Header {
            headers.insert(API_KEY_HEADER.to_string(), self.api_key.expose_secret().to_string());
        }

        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let body_bytes = match body {
            Some(body) => Some(Bytes::from(serde_json::to_vec(body)?)),
            None => None,
        };

        Ok(HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body: body_bytes,
        })
    }
}
