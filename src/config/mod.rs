//! Configuration types for the Gemini chat client.

use secrecy::SecretString;
use std::str::FromStr;
use std::time::Duration;
use url::Url;
use crate::error::{ConfigurationError, GeminiError};
use crate::resilience::RetryConfig;

/// Default Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default API version.
pub const DEFAULT_API_VERSION: &str = "v1beta";

/// Default request timeout (120 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default connect timeout (30 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Authentication method for API key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AuthMethod {
    /// Use x-goog-api-key header (recommended).
    #[default]
    Header,
    /// Use ?key= query parameter.
    QueryParam,
}

/// Log level for the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Trace level - very detailed information.
    Trace,
    /// Debug level - detailed information.
    Debug,
    /// Info level - general information.
    #[default]
    Info,
    /// Warning level - errors and warnings.
    Warn,
    /// Error level - only errors.
    Error,
}

/// Wire format requested from the streaming endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StreamFormat {
    /// A single JSON array whose elements arrive incrementally. The closing
    /// `]` marks the end of the stream.
    #[default]
    JsonArray,
    /// Server-sent events (`alt=sse`). The stream ends when the body closes
    /// at an event boundary after a chunk carrying a finish reason.
    ServerSentEvents,
}

impl FromStr for StreamFormat {
    type Err = GeminiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "array" => Ok(StreamFormat::JsonArray),
            "sse" => Ok(StreamFormat::ServerSentEvents),
            other => Err(ConfigurationError::InvalidConfiguration {
                message: format!("unknown stream format '{}'", other),
            }
            .into()),
        }
    }
}

/// Configuration for the Gemini chat client.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key (required).
    pub api_key: SecretString,
    /// Base URL for the API.
    pub base_url: Url,
    /// API version.
    pub api_version: String,
    /// Timeout for a whole request, streaming included.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Longest allowed gap between two body reads of a streamed response.
    pub chunk_timeout: Option<Duration>,
    /// Streaming wire format.
    pub stream_format: StreamFormat,
    /// Log level.
    pub log_level: LogLevel,
    /// Authentication method.
    pub auth_method: AuthMethod,
    /// Retry policy for requests that fail before a body is read.
    pub retry_config: RetryConfig,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url.as_str())
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("chunk_timeout", &self.chunk_timeout)
            .field("stream_format", &self.stream_format)
            .field("log_level", &self.log_level)
            .field("auth_method", &self.auth_method)
            .field("retry_config", &self.retry_config)
            .finish()
    }
}

impl GeminiConfig {
    /// Create a new configuration builder.
    pub fn builder() -> GeminiConfigBuilder {
        GeminiConfigBuilder::default()
    }

    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, GeminiError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .map_err(|_| ConfigurationError::MissingApiKey)?;

        let base_url = std::env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout_secs: u64 = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let api_version = std::env::var("GEMINI_API_VERSION")
            .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());

        let mut builder = Self::builder()
            .api_key(SecretString::new(api_key))
            .base_url(&base_url)?
            .api_version(&api_version)
            .timeout(Duration::from_secs(timeout_secs));

        if let Some(secs) = std::env::var("GEMINI_CHUNK_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            builder = builder.chunk_timeout(Duration::from_secs(secs));
        }

        if let Some(max_retries) = std::env::var("GEMINI_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
        {
            builder = builder.max_retries(max_retries);
        }

        if let Ok(format) = std::env::var("GEMINI_STREAM_FORMAT") {
            builder = builder.stream_format(format.parse()?);
        }

        builder.build()
    }
}

/// Builder for GeminiConfig.
#[derive(Default)]
pub struct GeminiConfigBuilder {
    api_key: Option<SecretString>,
    base_url: Option<Url>,
    api_version: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    chunk_timeout: Option<Duration>,
    stream_format: Option<StreamFormat>,
    log_level: Option<LogLevel>,
    auth_method: Option<AuthMethod>,
    max_retries: Option<u32>,
    retry_config: Option<RetryConfig>,
}

impl GeminiConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Set the base URL.
    pub fn base_url(mut self, base_url: &str) -> Result<Self, GeminiError> {
        self.base_url = Some(Url::parse(base_url)?);
        Ok(self)
    }

    /// Set the API version.
    pub fn api_version(mut self, version: &str) -> Self {
        self.api_version = Some(version.to_string());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the idle timeout between streamed body reads.
    pub fn chunk_timeout(mut self, timeout: Duration) -> Self {
        self.chunk_timeout = Some(timeout);
        self
    }

    /// Set the streaming wire format.
    pub fn stream_format(mut self, format: StreamFormat) -> Self {
        self.stream_format = Some(format);
        self
    }

    /// Set the log level.
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the authentication method.
    pub fn auth_method(mut self, method: AuthMethod) -> Self {
        self.auth_method = Some(method);
        self
    }

    /// Set the maximum retry attempts.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Set the retry configuration.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = Some(config);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<GeminiConfig, GeminiError> {
        let api_key = self.api_key
            .ok_or(ConfigurationError::MissingApiKey)?;

        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        if let Some(timeout) = self.chunk_timeout {
            if timeout.is_zero() {
                return Err(ConfigurationError::InvalidConfiguration {
                    message: "chunk timeout must be greater than zero".to_string(),
                }
                .into());
            }
        }

        let mut retry_config = self.retry_config.unwrap_or_default();
        if let Some(max_retries) = self.max_retries {
            retry_config.max_retries = max_retries;
        }

        Ok(GeminiConfig {
            api_key,
            base_url,
            api_version: self.api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            timeout: self.timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            connect_timeout: self.connect_timeout.unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)),
            chunk_timeout: self.chunk_timeout,
            stream_format: self.stream_format.unwrap_or_default(),
            log_level: self.log_level.unwrap_or_default(),
            auth_method: self.auth_method.unwrap_or_default(),
            retry_config,
        })
    }
}
