//! Frames decoded from a streamed response body.

use bytes::Bytes;
use futures::stream::Stream;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::config::StreamFormat;
use crate::error::{GeminiError, GeminiResult, ResponseError};
use crate::transport::{ChunkedStream, TransportError};
use crate::types::ChatCompletion;

use super::chunked_json::ChunkedJsonParser;
use super::sse::SseParser;

/// One decoded unit of a streamed response.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    /// An incremental generation chunk.
    Chunk(ChatCompletion),
    /// The end-of-stream sentinel. Nothing follows it.
    End,
}

/// A boxed stream of frames.
pub type FrameStream = Pin<Box<dyn Stream<Item = GeminiResult<StreamFrame>> + Send>>;

/// Push-based parser turning body bytes into frames.
pub trait FrameParser: Send {
    /// Consume the next piece of the body and return every frame it completes.
    fn feed(&mut self, data: &[u8]) -> Vec<GeminiResult<StreamFrame>>;

    /// Called once when the body ends; returns any frame still buffered.
    fn finish(&mut self) -> Vec<GeminiResult<StreamFrame>>;
}

/// Adapts a [`FrameParser`] to a byte stream.
///
/// After the first `End` frame or the first error the decoder yields
/// nothing more and releases the byte stream without reading further.
/// Transport errors are passed through unchanged.
pub struct FrameDecoder<P> {
    inner: ChunkedStream,
    parser: P,
    pending: VecDeque<GeminiResult<StreamFrame>>,
    source_closed: bool,
    stopped: bool,
}

impl<P: FrameParser> FrameDecoder<P> {
    /// Wrap a byte stream with the given parser.
    pub fn with_parser(inner: ChunkedStream, parser: P) -> Self {
        Self {
            inner,
            parser,
            pending: VecDeque::new(),
            source_closed: false,
            stopped: false,
        }
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.pending.clear();
        self.inner = Box::pin(futures::stream::empty::<Result<Bytes, TransportError>>());
    }
}

impl<P: FrameParser + Unpin> Stream for FrameDecoder<P> {
    type Item = GeminiResult<StreamFrame>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            if let Some(item) = this.pending.pop_front() {
                if matches!(item, Ok(StreamFrame::End) | Err(_)) {
                    this.stop();
                }
                return Poll::Ready(Some(item));
            }

            if this.stopped {
                return Poll::Ready(None);
            }

            if this.source_closed {
                this.stop();
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    let frames = this.parser.feed(&bytes);
                    this.pending.extend(frames);
                }
                Poll::Ready(Some(Err(e))) => {
                    this.stop();
                    return Poll::Ready(Some(Err(e.into())));
                }
                Poll::Ready(None) => {
                    this.source_closed = true;
                    let frames = this.parser.finish();
                    this.pending.extend(frames);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Decoder for the JSON array format.
pub type ChunkedJsonDecoder = FrameDecoder<ChunkedJsonParser>;

/// Decoder for the server-sent events format.
pub type SseDecoder = FrameDecoder<SseParser>;

impl ChunkedJsonDecoder {
    /// Decode a JSON array body.
    pub fn new(inner: ChunkedStream) -> Self {
        Self::with_parser(inner, ChunkedJsonParser::new())
    }
}

impl SseDecoder {
    /// Decode a server-sent events body.
    pub fn new(inner: ChunkedStream) -> Self {
        Self::with_parser(inner, SseParser::new())
    }
}

/// Decode `body` according to `format`.
pub fn decode_frames(format: StreamFormat, body: ChunkedStream) -> FrameStream {
    match format {
        StreamFormat::JsonArray => Box::pin(ChunkedJsonDecoder::new(body)),
        StreamFormat::ServerSentEvents => Box::pin(SseDecoder::new(body)),
    }
}

pub(crate) fn malformed(message: impl Into<String>, body: &[u8]) -> GeminiError {
    GeminiError::Response(ResponseError::MalformedChunk {
        message: message.into(),
        body: String::from_utf8_lossy(body).into_owned(),
    })
}

/// Deserialize one chunk object.
pub(crate) fn parse_chunk(raw: &[u8]) -> GeminiResult<StreamFrame> {
    serde_json::from_slice::<ChatCompletion>(raw)
        .map(StreamFrame::Chunk)
        .map_err(|e| malformed(format!("Failed to parse chunk: {}", e), raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn body(parts: Vec<Result<&'static str, TransportError>>) -> ChunkedStream {
        Box::pin(futures::stream::iter(
            parts
                .into_iter()
                .map(|p| p.map(|s| Bytes::from_static(s.as_bytes())))
                .collect::<Vec<_>>(),
        ))
    }

    #[tokio::test]
    async fn test_stops_reading_after_end() {
        let polled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&polled);
        let parts = vec![
            Ok(Bytes::from_static(b"[{\"candidates\":[]}]")),
            Ok(Bytes::from_static(b"garbage")),
        ];
        let inner: ChunkedStream = Box::pin(futures::stream::iter(parts).inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let frames: Vec<_> = ChunkedJsonDecoder::new(inner).collect().await;

        assert_eq!(frames.len(), 2);
        assert!(matches!(frames[1], Ok(StreamFrame::End)));
        assert_eq!(polled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_error_passes_through_and_ends() {
        let inner = body(vec![
            Ok("[{\"candidates\":[]},"),
            Err(TransportError::Connection("reset".to_string())),
            Ok("]"),
        ]);

        let frames: Vec<_> = decode_frames(StreamFormat::JsonArray, inner).collect().await;

        assert_eq!(frames.len(), 2);
        assert!(matches!(frames[0], Ok(StreamFrame::Chunk(_))));
        assert!(matches!(
            frames[1],
            Err(GeminiError::Network(crate::error::NetworkError::ConnectionFailed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_close_without_sentinel_just_ends() {
        let inner = body(vec![Ok("[{\"candidates\":[]}")]);

        let frames: Vec<_> = decode_frames(StreamFormat::JsonArray, inner).collect().await;

        assert_eq!(frames.len(), 1);
        assert!(matches!(frames[0], Ok(StreamFrame::Chunk(_))));
    }

    #[tokio::test]
    async fn test_decode_frames_sse() {
        let inner = body(vec![Ok("data: {\"candidates\":[]}\n\ndata: [DONE]\n\n")]);

        let frames: Vec<_> = decode_frames(StreamFormat::ServerSentEvents, inner).collect().await;

        assert_eq!(frames.len(), 2);
        assert!(matches!(frames[1], Ok(StreamFrame::End)));
    }

    #[tokio::test]
    async fn test_decode_frames_sse_ends_on_close_after_finish_reason() {
        let inner = body(vec![
            Ok("data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hi\"}]}}]}\r\n\r\n"),
            Ok("data: {\"candidates\":[{\"finishReason\":\"STOP\"}]}\r\n\r\n"),
        ]);

        let frames: Vec<_> = decode_frames(StreamFormat::ServerSentEvents, inner).collect().await;

        assert_eq!(frames.len(), 3);
        assert!(matches!(frames[2], Ok(StreamFrame::End)));
    }
}
