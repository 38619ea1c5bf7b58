//! Test fixtures for the Gemini chat client.
//!
//! Fixture files live next to this module: `chat/` holds whole
//! `generateContent` responses, `stream/` holds recorded
//! `streamGenerateContent` bodies in both wire formats, and `embeddings/`
//! holds `embedContent` and `batchEmbedContents` responses.

use bytes::Bytes;
use std::path::PathBuf;

/// Get the path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("src")
        .join("fixtures")
        .join(relative_path)
}

/// Load a fixture file as a string.
pub fn load_fixture(relative_path: &str) -> String {
    std::fs::read_to_string(fixture_path(relative_path))
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", relative_path, e))
}

/// Load a JSON fixture and parse it.
pub fn load_json_fixture<T: serde::de::DeserializeOwned>(relative_path: &str) -> T {
    let content = load_fixture(relative_path);
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse JSON fixture {}: {}", relative_path, e))
}

/// Load a stream fixture split into reads of at most `read_size` bytes.
///
/// Splits fall on arbitrary byte boundaries, including inside multi-byte
/// characters, the way a network read would.
pub fn load_stream_fixture(relative_path: &str, read_size: usize) -> Vec<Bytes> {
    let content = Bytes::from(load_fixture(relative_path));
    let read_size = read_size.max(1);
    (0..content.len())
        .step_by(read_size)
        .map(|start| content.slice(start..(start + read_size).min(content.len())))
        .collect()
}
