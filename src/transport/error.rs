//! Transport layer error types.

use std::collections::HashMap;
use std::time::Duration;

/// Transport error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("No data received within {0:?}")]
    Timeout(Duration),
    #[error("Request error: {0}")]
    Request(String),
    /// The server answered with a non-success status before any body was streamed.
    #[error("HTTP error {status}: {body}")]
    Status {
        status: u16,
        headers: HashMap<String, String>,
        body: String,
    },
}
