//! Gemini chat model implementation.

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use serde_json::json;

use super::request::{build_request_prompt, create_request, merge_options, DEFAULT_CHAT_MODEL, DEFAULT_TEMPERATURE};
use super::{ChatModel, ChatResponseStream};
use crate::config::GeminiConfig;
use crate::error::{ConfigurationError, GeminiError, GeminiResult};
use crate::observability::{Logger, StructuredLogger};
use crate::resilience::RetryExecutor;
use crate::streaming::{
    accumulate, build_generation, decode_frames, extract_usage, AggregationOptions,
    ResponseAggregator,
};
use crate::transport::{
    endpoints, with_idle_timeout, HttpMethod, HttpTransport, ReqwestTransport, RequestBuilder,
    ResponseParser,
};
use crate::types::{
    ChatCompletion, ChatOptions, ChatResponse, ChatResponseMetadata, Prompt, Usage,
};

/// Chat model talking to the Gemini API.
pub struct GeminiChatModel {
    config: Arc<GeminiConfig>,
    transport: Arc<dyn HttpTransport>,
    request_builder: RequestBuilder,
    retry: RetryExecutor,
    default_options: ChatOptions,
    logger: Box<dyn Logger>,
}

impl GeminiChatModel {
    /// Create a builder.
    pub fn builder() -> GeminiChatModelBuilder {
        GeminiChatModelBuilder::default()
    }

    /// The options every request starts from.
    pub fn default_options(&self) -> &ChatOptions {
        &self.default_options
    }

    /// The client configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Call `generateContent` with a prompt whose options are already merged.
    ///
    /// Retryable failures are retried according to the configured
    /// [`RetryConfig`](crate::resilience::RetryConfig). The usage of
    /// `previous`, when given, is added to the usage reported for this call.
    pub async fn internal_call(
        &self,
        prompt: &Prompt,
        previous: Option<&ChatResponse>,
    ) -> GeminiResult<ChatResponse> {
        let request = create_request(prompt, false)?;

        self.logger.debug("Starting chat call", json!({
            "model": request.model,
            "messages": request.contents.len(),
        }));

        let http_request = self.request_builder.build_request(
            HttpMethod::Post,
            &endpoints::generate_content(&request.model),
            &[],
            Some(&request),
            Some(additional_headers(prompt)),
        )?;

        let transport = &self.transport;
        let http_request = &http_request;
        let http_response = self.retry
            .execute(|| async move {
                let response = transport.send(http_request.clone()).await?;
                ResponseParser::check_status(response)
            })
            .await
            .map_err(|e| self.transport_failure("Chat call failed", &request.model, e))?;

        let rate_limit = ResponseParser::extract_rate_limit(&http_response.headers);
        let completion: ChatCompletion = ResponseParser::parse_response(http_response)?;

        if completion.candidates.is_empty() {
            self.logger.warn("No candidates returned for prompt", json!({
                "model": request.model,
                "messages": request.contents.len(),
            }));
            return Ok(ChatResponse::default());
        }

        let generations = completion
            .candidates
            .iter()
            .enumerate()
            .map(|(position, candidate)| {
                let slot = candidate.index.unwrap_or(position as u32);
                build_generation(slot, candidate, &HashMap::new())
            })
            .collect::<GeminiResult<Vec<_>>>()?;

        let previous_usage = previous.map(|response| response.metadata.usage);
        let usage = accumulate(
            previous_usage.unwrap_or_else(Usage::empty),
            extract_usage(&completion),
            previous_usage,
        );

        self.logger.info("Chat call completed", json!({
            "model": request.model,
            "generations": generations.len(),
            "prompt_tokens": usage.prompt_tokens,
            "completion_tokens": usage.completion_tokens,
            "total_tokens": usage.total_tokens,
        }));

        Ok(ChatResponse::new(
            generations,
            ChatResponseMetadata {
                model: completion.model_version.unwrap_or_default(),
                usage,
                rate_limit,
            },
        ))
    }

    /// Call `streamGenerateContent` with a prompt whose options are already
    /// merged, and aggregate the streamed chunks.
    ///
    /// Only opening the stream is retried. Once the body started, a failure
    /// ends the stream with `TruncatedStream`.
    ///
    /// The usage of `previous`, when given, is added to every usage the
    /// stream reports.
    pub async fn internal_stream(
        &self,
        prompt: &Prompt,
        previous: Option<&ChatResponse>,
    ) -> GeminiResult<ChatResponseStream> {
        let request = create_request(prompt, true)?;
        let format = self.config.stream_format;

        self.logger.debug("Starting chat stream", json!({
            "model": request.model,
            "messages": request.contents.len(),
            "format": format!("{:?}", format),
        }));

        let http_request = self.request_builder.build_request(
            HttpMethod::Post,
            &endpoints::stream_generate_content(&request.model),
            &endpoints::stream_query(format),
            Some(&request),
            Some(additional_headers(prompt)),
        )?;

        let transport = &self.transport;
        let http_request = &http_request;
        let response = self.retry
            .execute(|| async move {
                transport
                    .send_streaming(http_request.clone())
                    .await
                    .map_err(GeminiError::from)
            })
            .await
            .map_err(|e| self.transport_failure("Chat stream failed to open", &request.model, e))?;

        let body = match self.config.chunk_timeout {
            Some(idle) => with_idle_timeout(response.body, idle),
            None => response.body,
        };

        let options = AggregationOptions {
            previous_usage: previous.map(|response| response.metadata.usage),
            metadata: HashMap::new(),
            rate_limit: ResponseParser::extract_rate_limit(&response.headers),
        };

        let aggregator = ResponseAggregator::new(decode_frames(format, body), options);
        Ok(Box::pin(aggregator))
    }

    fn transport_failure(&self, message: &str, model: &str, error: GeminiError) -> GeminiError {
        self.logger.error(message, json!({
            "error": error.to_string(),
            "model": model,
            "retryable": error.is_retryable(),
        }));
        error
    }
}

/// HTTP headers sent with a request: the merged option headers.
fn additional_headers(prompt: &Prompt) -> HashMap<String, String> {
    prompt
        .options
        .as_ref()
        .map(|options| options.http_headers.clone())
        .unwrap_or_default()
}

#[async_trait]
impl ChatModel for GeminiChatModel {
    async fn call(&self, prompt: Prompt) -> GeminiResult<ChatResponse> {
        let request_prompt = build_request_prompt(&prompt, &self.default_options);
        self.internal_call(&request_prompt, None).await
    }

    async fn stream(&self, prompt: Prompt) -> GeminiResult<ChatResponseStream> {
        let request_prompt = build_request_prompt(&prompt, &self.default_options);
        self.internal_stream(&request_prompt, None).await
    }
}

/// Builder for [`GeminiChatModel`].
#[derive(Default)]
pub struct GeminiChatModelBuilder {
    config: Option<GeminiConfig>,
    transport: Option<Arc<dyn HttpTransport>>,
    default_options: Option<ChatOptions>,
    logger: Option<Box<dyn Logger>>,
}

impl GeminiChatModelBuilder {
    /// Set the client configuration (required).
    pub fn config(mut self, config: GeminiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a custom transport instead of `reqwest`.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the default options. Unset fields fall back to the built-in
    /// model and temperature.
    pub fn default_options(mut self, options: ChatOptions) -> Self {
        self.default_options = Some(options);
        self
    }

    /// Set the logger.
    pub fn logger(mut self, logger: Box<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Build the chat model.
    pub fn build(self) -> GeminiResult<GeminiChatModel> {
        let config = self.config.ok_or_else(|| ConfigurationError::InvalidConfiguration {
            message: "a GeminiConfig is required".to_string(),
        })?;

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                ReqwestTransport::new(config.timeout, config.connect_timeout)
                    .map_err(GeminiError::from)?,
            ),
        };

        let built_in = ChatOptions::default()
            .with_model(DEFAULT_CHAT_MODEL)
            .with_temperature(DEFAULT_TEMPERATURE);
        let default_options = match self.default_options {
            Some(options) => merge_options(Some(&options), &built_in),
            None => built_in,
        };

        let logger = self.logger.unwrap_or_else(|| {
            Box::new(StructuredLogger::new("gemini.chat").with_level(config.log_level))
        });

        Ok(GeminiChatModel {
            request_builder: RequestBuilder::from_config(&config),
            retry: RetryExecutor::new(config.retry_config.clone()),
            config: Arc::new(config),
            transport,
            default_options,
            logger,
        })
    }
}
