//! Streaming support for Gemini chat responses.
//!
//! A streamed response goes through three stages:
//! - a frame decoder turns body bytes into [`StreamFrame`]s, for either the
//!   JSON array format (closing `]` ends the stream) or server-sent events
//!   (the body closing after a finished chunk ends the stream)
//! - the [`ResponseAggregator`] turns each chunk into a snapshot, building
//!   one generation per candidate and folding usage
//! - at the end sentinel the [`MessageConcatenator`] joins all snapshots
//!   into the final response
//!
//! ## Example
//!
//! ```rust,no_run
//! use integrations_gemini_chat::streaming::{
//!     decode_frames, AggregationOptions, ResponseAggregator, StreamItem,
//! };
//! use integrations_gemini_chat::config::StreamFormat;
//! use integrations_gemini_chat::transport::ChunkedStream;
//! use futures::StreamExt;
//!
//! async fn print_stream(body: ChunkedStream) -> integrations_gemini_chat::GeminiResult<()> {
//!     let frames = decode_frames(StreamFormat::JsonArray, body);
//!     let mut aggregator = ResponseAggregator::new(frames, AggregationOptions::default());
//!
//!     while let Some(item) = aggregator.next().await {
//!         match item? {
//!             StreamItem::Snapshot(snapshot) => {
//!                 if let Some(generation) = snapshot.result() {
//!                     print!("{}", generation.text());
//!                 }
//!             }
//!             StreamItem::Completed(response) => {
//!                 println!("\ntotal tokens: {}", response.usage().total_count());
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod aggregator;
mod chunked_json;
mod concatenator;
mod frame;
mod generation;
mod sse;
mod usage;

pub use aggregator::{AggregationOptions, ResponseAggregator, StreamItem};
pub use chunked_json::ChunkedJsonParser;
pub use concatenator::{concatenate, MessageConcatenator};
pub use frame::{
    decode_frames, ChunkedJsonDecoder, FrameDecoder, FrameParser, FrameStream, SseDecoder,
    StreamFrame,
};
pub use generation::{build_generation, ROLE_METADATA_KEY};
pub use sse::{SseEvent, SseParser, DONE_SENTINEL};
pub use usage::{accumulate, extract_usage};
