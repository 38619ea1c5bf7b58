//! Usage extraction and accumulation for streamed responses.

use crate::types::{ChatCompletion, Usage};

/// Usage reported by a chunk, or `None` when the chunk carries no usage
/// metadata.
pub fn extract_usage(chunk: &ChatCompletion) -> Option<Usage> {
    chunk.usage_metadata.as_ref().map(Usage::from)
}

/// Fold one chunk's usage into the running usage.
///
/// Within one call the API reports usage cumulatively, so a chunk that
/// reports usage replaces the running value rather than adding to it. The
/// usage of the previous turn, if any, is added on top so the result covers
/// the whole conversation. A chunk without usage leaves `current` as is.
pub fn accumulate(current: Usage, chunk_usage: Option<Usage>, previous: Option<Usage>) -> Usage {
    match (chunk_usage, previous) {
        (None, _) => current,
        (Some(chunk), None) => chunk,
        (Some(chunk), Some(previous)) => chunk + previous,
    }
}
