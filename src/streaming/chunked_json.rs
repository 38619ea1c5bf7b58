//! Chunked JSON streaming support.
//!
//! Without `alt=sse`, `streamGenerateContent` returns a single JSON array
//! whose elements arrive incrementally:
//! ```json
//! [{"candidates":[...],"usageMetadata":...}
//! ,{"candidates":[...],"usageMetadata":...}
//! ]
//! ```
//! The closing `]` is the end-of-stream sentinel.

use crate::error::GeminiResult;

use super::frame::{malformed, parse_chunk, FrameParser, StreamFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    /// Expecting the opening `[`.
    ExpectingStart,
    /// Inside the array, expecting an object, a comma or `]`.
    InArray,
    /// The closing `]` was seen.
    Completed,
    /// A decode error was reported.
    Failed,
}

/// Parser for Gemini's chunked JSON array format.
///
/// Handles objects split across reads (including multi-byte UTF-8
/// characters), nested objects and arrays, and braces or escaped quotes
/// inside strings.
#[derive(Debug)]
pub struct ChunkedJsonParser {
    buffer: Vec<u8>,
    state: ParserState,
}

impl ChunkedJsonParser {
    /// Create a parser expecting the start of the array.
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            state: ParserState::ExpectingStart,
        }
    }

    /// Returns true once the closing `]` was consumed.
    pub fn is_complete(&self) -> bool {
        self.state == ParserState::Completed
    }

    fn next_frame(&mut self) -> Option<GeminiResult<StreamFrame>> {
        loop {
            let in_array = self.state == ParserState::InArray;
            let skip = self
                .buffer
                .iter()
                .take_while(|&&b| b.is_ascii_whitespace() || (in_array && b == b','))
                .count();
            self.buffer.drain(..skip);

            let first = *self.buffer.first()?;

            match self.state {
                ParserState::ExpectingStart => {
                    if first != b'[' {
                        return Some(self.fail("Expected '[' at start of stream"));
                    }
                    self.buffer.drain(..1);
                    self.state = ParserState::InArray;
                }
                ParserState::InArray => {
                    return match first {
                        b']' => {
                            self.buffer.drain(..1);
                            self.state = ParserState::Completed;
                            Some(Ok(StreamFrame::End))
                        }
                        b'{' => {
                            let end = object_end(&self.buffer)?;
                            let raw: Vec<u8> = self.buffer.drain(..end).collect();
                            let frame = parse_chunk(&raw);
                            if frame.is_err() {
                                self.state = ParserState::Failed;
                            }
                            Some(frame)
                        }
                        _ => Some(self.fail("Unexpected data between chunks")),
                    };
                }
                ParserState::Completed | ParserState::Failed => return None,
            }
        }
    }

    fn fail(&mut self, message: &str) -> GeminiResult<StreamFrame> {
        self.state = ParserState::Failed;
        Err(malformed(message, &self.buffer))
    }
}

impl Default for ChunkedJsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser for ChunkedJsonParser {
    fn feed(&mut self, data: &[u8]) -> Vec<GeminiResult<StreamFrame>> {
        if matches!(self.state, ParserState::Completed | ParserState::Failed) {
            return Vec::new();
        }

        self.buffer.extend_from_slice(data);
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame() {
            frames.push(frame);
        }
        frames
    }

    fn finish(&mut self) -> Vec<GeminiResult<StreamFrame>> {
        let dangling = self.buffer.iter().filter(|b| !b.is_ascii_whitespace()).count();
        if dangling > 0 && self.state == ParserState::InArray {
            tracing::debug!(dangling_bytes = dangling, "stream closed inside a chunk");
        }
        self.buffer.clear();
        Vec::new()
    }
}

/// Returns the length of the complete JSON object at the start of `input`,
/// or `None` if the object is not complete yet.
///
/// Brace and bracket depth is tracked outside strings only; escape
/// sequences inside strings are skipped.
fn object_end(input: &[u8]) -> Option<usize> {
    if input.first() != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &byte) in input.iter().enumerate() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match byte {
            b'\\' if in_string => escape_next = true,
            b'"' => in_string = !in_string,
            b'{' | b'[' if !in_string => depth += 1,
            b'}' | b']' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}
