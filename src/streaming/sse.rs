//! Server-sent events support (`alt=sse`).
//!
//! Each event's `data:` field carries one JSON chunk. The API sends no
//! sentinel: the stream is complete when the body closes at an event
//! boundary after a chunk has reported a finish reason. A close inside an
//! event, or before any finish reason, is left to the caller as truncation.
//! A `data: [DONE]` event is still accepted as an explicit end.

use crate::error::GeminiResult;

use super::frame::{malformed, parse_chunk, FrameParser, StreamFrame};

/// Data value marking the end of the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// A parsed SSE event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SseEvent {
    /// Event type (from "event:" field).
    pub event: Option<String>,
    /// Event data (from "data:" fields, joined with `\n`).
    pub data: String,
    /// Event ID (from "id:" field).
    pub id: Option<String>,
}

impl SseEvent {
    /// Check if this is the end-of-stream event.
    pub fn is_done(&self) -> bool {
        self.data.trim() == DONE_SENTINEL
    }
}

/// Parser for SSE bodies carrying Gemini chunks.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    current_event: Option<String>,
    current_data: Vec<String>,
    current_id: Option<String>,
    finish_reason_seen: bool,
    stopped: bool,
}

impl SseParser {
    /// Create a new SSE parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and return the events they complete.
    ///
    /// Lines are only decoded once complete, so a multi-byte character split
    /// across reads is handled.
    pub fn feed_events(&mut self, data: &[u8]) -> Vec<GeminiResult<SseEvent>> {
        self.buffer.extend_from_slice(data);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = match std::str::from_utf8(&raw) {
                Ok(line) => line.trim_end_matches(&['\n', '\r'][..]),
                Err(_) => {
                    events.push(Err(malformed("Invalid UTF-8 in event stream", &raw)));
                    break;
                }
            };

            if line.is_empty() {
                if let Some(event) = self.take_event() {
                    events.push(Ok(event));
                }
            } else if line.starts_with(':') {
                // comment
            } else if let Some(value) = line.strip_prefix("data:") {
                self.current_data.push(strip_space(value).to_string());
            } else if let Some(value) = line.strip_prefix("event:") {
                self.current_event = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("id:") {
                self.current_id = Some(value.trim().to_string());
            }
            // "retry:" and unknown fields are ignored.
        }

        events
    }

    /// Flush a final event that was not terminated by a blank line.
    pub fn flush_event(&mut self) -> Option<SseEvent> {
        if !self.buffer.is_empty() {
            let mut line = std::mem::take(&mut self.buffer);
            line.push(b'\n');
            if let Some(Err(e)) = self.feed_events(&line).pop() {
                tracing::debug!(error = %e, "discarding undecodable trailing line");
            }
        }
        self.take_event()
    }

    fn take_event(&mut self) -> Option<SseEvent> {
        if self.current_data.is_empty() {
            self.current_event = None;
            self.current_id = None;
            return None;
        }

        Some(SseEvent {
            event: self.current_event.take(),
            data: std::mem::take(&mut self.current_data).join("\n"),
            id: self.current_id.take(),
        })
    }

    fn frame_for(&mut self, event: GeminiResult<SseEvent>) -> Option<GeminiResult<StreamFrame>> {
        if self.stopped {
            return None;
        }

        let frame = match event {
            Ok(event) if event.is_done() => Ok(StreamFrame::End),
            Ok(event) => parse_chunk(event.data.as_bytes()),
            Err(e) => Err(e),
        };

        if let Ok(StreamFrame::Chunk(chunk)) = &frame {
            if chunk
                .candidates
                .iter()
                .any(|c| c.finish_reason.as_deref().map_or(false, |r| !r.is_empty()))
            {
                self.finish_reason_seen = true;
            }
        }

        if !matches!(frame, Ok(StreamFrame::Chunk(_))) {
            self.stopped = true;
        }
        Some(frame)
    }
}

/// A single optional space after the colon is not part of the value.
fn strip_space(value: &str) -> &str {
    value.strip_prefix(' ').unwrap_or(value)
}

impl FrameParser for SseParser {
    fn feed(&mut self, data: &[u8]) -> Vec<GeminiResult<StreamFrame>> {
        if self.stopped {
            return Vec::new();
        }

        self.feed_events(data)
            .into_iter()
            .filter_map(|event| self.frame_for(event))
            .collect()
    }

    fn finish(&mut self) -> Vec<GeminiResult<StreamFrame>> {
        if self.stopped {
            return Vec::new();
        }

        match self.flush_event() {
            Some(event) if event.is_done() => self.frame_for(Ok(event)).into_iter().collect(),
            Some(_) => {
                tracing::debug!("event stream closed inside an event");
                Vec::new()
            }
            None if self.finish_reason_seen => {
                tracing::debug!("event stream closed after final chunk");
                self.stopped = true;
                vec![Ok(StreamFrame::End)]
            }
            None => Vec::new(),
        }
    }
}
