//! The response aggregator: folds a frame stream into snapshots and a final
//! response.

use futures::stream::{Stream, StreamExt};
use futures::ready;
use serde_json::Value;
use std::collections::HashMap;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::{GeminiError, GeminiResult};
use crate::types::{ChatCompletion, ChatResponse, ChatResponseMetadata, RateLimit, Usage};

use super::concatenator::MessageConcatenator;
use super::frame::{FrameStream, StreamFrame};
use super::generation::build_generation;
use super::usage::{accumulate, extract_usage};

/// An item produced by [`ResponseAggregator`].
#[derive(Debug, Clone, PartialEq)]
pub enum StreamItem {
    /// The generations of one chunk, with the usage accumulated so far.
    Snapshot(ChatResponse),
    /// The concatenated response. Always the last item of a clean stream.
    Completed(ChatResponse),
}

impl StreamItem {
    /// The response carried by this item.
    pub fn response(&self) -> &ChatResponse {
        match self {
            StreamItem::Snapshot(response) | StreamItem::Completed(response) => response,
        }
    }

    /// Consume the item, returning its response.
    pub fn into_response(self) -> ChatResponse {
        match self {
            StreamItem::Snapshot(response) | StreamItem::Completed(response) => response,
        }
    }

    /// Returns true for the final response.
    pub fn is_completed(&self) -> bool {
        matches!(self, StreamItem::Completed(_))
    }
}

/// Per-call inputs of an aggregation.
#[derive(Debug, Clone, Default)]
pub struct AggregationOptions {
    /// Usage of the previous turn, added to every reported usage.
    pub previous_usage: Option<Usage>,
    /// Metadata attached to every generation.
    pub metadata: HashMap<String, Value>,
    /// Rate limit information read from the response headers.
    pub rate_limit: Option<RateLimit>,
}

impl AggregationOptions {
    /// Set the previous turn's usage.
    pub fn with_previous_usage(mut self, usage: Usage) -> Self {
        self.previous_usage = Some(usage);
        self
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Set the rate limit.
    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }
}

/// State owned by one aggregation.
#[derive(Debug)]
struct AggregationContext {
    previous_usage: Option<Usage>,
    usage: Usage,
    model: String,
    metadata: HashMap<String, Value>,
    rate_limit: Option<RateLimit>,
    concatenator: MessageConcatenator,
    chunks_received: usize,
}

impl AggregationContext {
    fn new(options: AggregationOptions) -> Self {
        let usage = options.previous_usage.unwrap_or_else(Usage::empty);
        let mut context = Self {
            previous_usage: options.previous_usage,
            usage,
            model: String::new(),
            metadata: options.metadata,
            rate_limit: options.rate_limit,
            concatenator: MessageConcatenator::new(),
            chunks_received: 0,
        };
        context.concatenator = MessageConcatenator::with_metadata(context.response_metadata());
        context
    }

    fn response_metadata(&self) -> ChatResponseMetadata {
        ChatResponseMetadata {
            model: self.model.clone(),
            usage: self.usage,
            rate_limit: self.rate_limit.clone(),
        }
    }

    fn apply(&mut self, chunk: ChatCompletion) -> GeminiResult<ChatResponse> {
        let index = self.chunks_received;
        self.chunks_received += 1;

        self.usage = accumulate(self.usage, extract_usage(&chunk), self.previous_usage);
        if let Some(model) = chunk.model_version {
            self.model = model;
        }

        let results = chunk
            .candidates
            .iter()
            .enumerate()
            .map(|(position, candidate)| {
                let slot = candidate.index.unwrap_or(position as u32);
                build_generation(slot, candidate, &self.metadata)
            })
            .collect::<GeminiResult<Vec<_>>>()?;

        tracing::debug!(
            chunk = index,
            generations = results.len(),
            total_tokens = ?self.usage.total_tokens,
            "aggregated stream chunk"
        );

        let snapshot = ChatResponse::new(results, self.response_metadata());
        self.concatenator.push(&snapshot);
        Ok(snapshot)
    }

    fn finish(self) -> ChatResponse {
        self.concatenator.finish()
    }
}

/// Folds a stream of frames into per-chunk snapshots followed by the final
/// concatenated response.
///
/// - one [`StreamItem::Snapshot`] per chunk, in arrival order
/// - on the end sentinel, one [`StreamItem::Completed`], then the stream ends
/// - on any failure, one error, then the stream ends with no final response
///
/// A source that closes or fails before the sentinel is reported as
/// `TruncatedStream`; the transport error, if any, is its cause. One frame is
/// pulled per poll. Dropping the aggregator drops the frame source.
pub struct ResponseAggregator {
    frames: FrameStream,
    context: Option<AggregationContext>,
}

impl ResponseAggregator {
    /// Aggregate `frames` with the given per-call options.
    pub fn new<S>(frames: S, options: AggregationOptions) -> Self
    where
        S: Stream<Item = GeminiResult<StreamFrame>> + Send + 'static,
    {
        Self {
            frames: Box::pin(frames),
            context: Some(AggregationContext::new(options)),
        }
    }

    /// Chunks processed so far.
    pub fn chunks_received(&self) -> usize {
        self.context.as_ref().map_or(0, |c| c.chunks_received)
    }

    /// Drive the stream to the end and return the final response, or the
    /// error that ended it.
    pub async fn collect_final(mut self) -> GeminiResult<ChatResponse> {
        let mut chunks = 0;
        while let Some(item) = self.next().await {
            match item? {
                StreamItem::Snapshot(_) => chunks += 1,
                StreamItem::Completed(response) => return Ok(response),
            }
        }
        Err(GeminiError::truncated(chunks, None))
    }

    fn close(&mut self) {
        self.context = None;
        self.frames = Box::pin(futures::stream::empty::<GeminiResult<StreamFrame>>());
    }
}

impl Stream for ResponseAggregator {
    type Item = GeminiResult<StreamItem>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        let context = match this.context.as_mut() {
            Some(context) => context,
            None => return Poll::Ready(None),
        };

        let frame = ready!(this.frames.as_mut().poll_next(cx));

        match frame {
            Some(Ok(StreamFrame::Chunk(chunk))) => match context.apply(chunk) {
                Ok(snapshot) => Poll::Ready(Some(Ok(StreamItem::Snapshot(snapshot)))),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to build generation from stream chunk");
                    this.close();
                    Poll::Ready(Some(Err(e)))
                }
            },
            Some(Ok(StreamFrame::End)) => {
                let context = this.context.take();
                this.close();
                Poll::Ready(context.map(|context| {
                    let chunks = context.chunks_received;
                    let response = context.finish();
                    tracing::debug!(
                        chunks,
                        generations = response.results.len(),
                        total_tokens = ?response.metadata.usage.total_tokens,
                        "stream completed"
                    );
                    Ok(StreamItem::Completed(response))
                }))
            }
            Some(Err(e)) => {
                let chunks = context.chunks_received;
                this.close();
                let error = if e.is_malformed_chunk() {
                    e
                } else {
                    GeminiError::truncated(chunks, Some(e))
                };
                tracing::warn!(chunks, error = %error, "stream failed before completion");
                Poll::Ready(Some(Err(error)))
            }
            None => {
                let chunks = context.chunks_received;
                this.close();
                tracing::warn!(chunks, "stream closed before the end sentinel");
                Poll::Ready(Some(Err(GeminiError::truncated(chunks, None))))
            }
        }
    }
}
