//! Gemini embedding model implementation.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use super::validation::{validate_batch_size, validate_embed_request};
use super::EmbeddingModel;
use crate::config::GeminiConfig;
use crate::error::{ConfigurationError, GeminiError, GeminiResult};
use crate::observability::{Logger, StructuredLogger};
use crate::resilience::RetryExecutor;
use crate::transport::{
    endpoints, HttpMethod, HttpTransport, ReqwestTransport, RequestBuilder, ResponseParser,
};
use crate::types::{
    BatchEmbedContentsRequest, BatchEmbedContentsResponse, Content, EmbedContentRequest,
    EmbedContentResponse, Embedding, EmbeddingOptions, EmbeddingRequest, EmbeddingResponse,
    EmbeddingResponseMetadata, Part, Usage,
};

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "gemini-embedding-exp-03-07";

/// Merge runtime options over defaults, field by field.
///
/// Runtime headers override default headers with the same name.
pub fn merge_embedding_options(
    runtime: Option<&EmbeddingOptions>,
    defaults: &EmbeddingOptions,
) -> EmbeddingOptions {
    let Some(runtime) = runtime else {
        return defaults.clone();
    };

    let mut http_headers = defaults.http_headers.clone();
    http_headers.extend(runtime.http_headers.iter().map(|(k, v)| (k.clone(), v.clone())));

    EmbeddingOptions {
        model: runtime.model.clone().or_else(|| defaults.model.clone()),
        dimensions: runtime.dimensions.or(defaults.dimensions),
        task_type: runtime.task_type.or(defaults.task_type),
        title: runtime.title.clone().or_else(|| defaults.title.clone()),
        http_headers,
    }
}

/// One validated `embedContent` request per input.
///
/// # Errors
///
/// `ValidationError` for an empty or oversized batch, or for an input the
/// embedding endpoints would reject.
pub fn create_requests(
    inputs: &[String],
    options: &EmbeddingOptions,
) -> GeminiResult<Vec<EmbedContentRequest>> {
    validate_batch_size(inputs.len())?;

    let model = options.model.as_deref().unwrap_or(DEFAULT_EMBEDDING_MODEL);
    inputs
        .iter()
        .map(|input| {
            let request = EmbedContentRequest {
                model: endpoints::model_resource(model),
                content: Content {
                    role: None,
                    parts: vec![Part::text(input.clone())],
                },
                task_type: options.task_type,
                title: options.title.clone(),
                output_dimensionality: options.dimensions,
            };
            validate_embed_request(&request)?;
            Ok(request)
        })
        .collect()
}

/// Embedding model talking to the Gemini API.
pub struct GeminiEmbeddingModel {
    transport: Arc<dyn HttpTransport>,
    request_builder: RequestBuilder,
    retry: RetryExecutor,
    default_options: EmbeddingOptions,
    logger: Box<dyn Logger>,
}

impl GeminiEmbeddingModel {
    /// Create a builder.
    pub fn builder() -> GeminiEmbeddingModelBuilder {
        GeminiEmbeddingModelBuilder::default()
    }

    /// The options every request starts from.
    pub fn default_options(&self) -> &EmbeddingOptions {
        &self.default_options
    }

    /// Call `embedContent` for a single request.
    pub async fn embed_content(&self, request: &EmbedContentRequest) -> GeminiResult<EmbedContentResponse> {
        validate_embed_request(request)?;
        self.post(&endpoints::embed_content(&request.model), request, &self.default_options.http_headers)
            .await
    }

    /// Call `batchEmbedContents` for up to [`MAX_BATCH_SIZE`](super::MAX_BATCH_SIZE)
    /// requests that share `model`.
    pub async fn batch_embed_contents(
        &self,
        model: &str,
        requests: Vec<EmbedContentRequest>,
        headers: &HashMap<String, String>,
    ) -> GeminiResult<BatchEmbedContentsResponse> {
        validate_batch_size(requests.len())?;
        for request in &requests {
            validate_embed_request(request)?;
        }

        let body = BatchEmbedContentsRequest { requests };
        self.post(&endpoints::batch_embed_contents(model), &body, headers).await
    }

    async fn post<T, R>(&self, path: &str, body: &T, headers: &HashMap<String, String>) -> GeminiResult<R>
    where
        T: Serialize + Sync,
        R: DeserializeOwned,
    {
        let http_request = self.request_builder.build_request(
            HttpMethod::Post,
            path,
            &[],
            Some(body),
            Some(headers.clone()),
        )?;

        let transport = &self.transport;
        let http_request = &http_request;
        let http_response = self.retry
            .execute(|| async move {
                let response = transport.send(http_request.clone()).await?;
                ResponseParser::check_status(response)
            })
            .await
            .map_err(|e| {
                self.logger.error("Embedding request failed", json!({
                    "error": e.to_string(),
                    "path": path,
                    "retryable": e.is_retryable(),
                }));
                e
            })?;

        ResponseParser::parse_response(http_response)
    }
}

#[async_trait]
impl EmbeddingModel for GeminiEmbeddingModel {
    async fn call(&self, request: EmbeddingRequest) -> GeminiResult<EmbeddingResponse> {
        let options = merge_embedding_options(request.options.as_ref(), &self.default_options);
        let requests = create_requests(&request.inputs, &options)?;
        let model = options
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string());

        self.logger.debug("Starting embedding call", json!({
            "model": model,
            "inputs": requests.len(),
        }));

        let response = self
            .batch_embed_contents(&model, requests, &options.http_headers)
            .await?;

        if response.embeddings.is_empty() {
            self.logger.warn("No embeddings returned for request", json!({
                "model": model,
                "inputs": request.inputs.len(),
            }));
            return Ok(EmbeddingResponse::default());
        }

        let results: Vec<Embedding> = response
            .embeddings
            .into_iter()
            .enumerate()
            .map(|(index, embedding)| Embedding {
                index,
                output: embedding.values,
            })
            .collect();

        self.logger.info("Embedding call completed", json!({
            "model": model,
            "embeddings": results.len(),
        }));

        Ok(EmbeddingResponse {
            results,
            metadata: EmbeddingResponseMetadata {
                model,
                usage: Usage::empty(),
            },
        })
    }
}

/// Builder for [`GeminiEmbeddingModel`].
#[derive(Default)]
pub struct GeminiEmbeddingModelBuilder {
    config: Option<GeminiConfig>,
    transport: Option<Arc<dyn HttpTransport>>,
    default_options: Option<EmbeddingOptions>,
    logger: Option<Box<dyn Logger>>,
}

impl GeminiEmbeddingModelBuilder {
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

    /// Set the default options. An unset model falls back to
    /// [`DEFAULT_EMBEDDING_MODEL`].
    pub fn default_options(mut self, options: EmbeddingOptions) -> Self {
        self.default_options = Some(options);
        self
    }

    /// Set the logger.
    pub fn logger(mut self, logger: Box<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Build the embedding model.
    pub fn build(self) -> GeminiResult<GeminiEmbeddingModel> {
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

        let built_in = EmbeddingOptions::default().with_model(DEFAULT_EMBEDDING_MODEL);
        let default_options = merge_embedding_options(self.default_options.as_ref(), &built_in);

        let logger = self.logger.unwrap_or_else(|| {
            Box::new(StructuredLogger::new("gemini.embeddings").with_level(config.log_level))
        });

        Ok(GeminiEmbeddingModel {
            transport,
            request_builder: RequestBuilder::from_config(&config),
            retry: RetryExecutor::new(config.retry_config.clone()),
            default_options,
            logger,
        })
    }
}
