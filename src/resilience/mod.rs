//! Resilience for Gemini API calls.
//!
//! Requests that fail before any response body was consumed are retried
//! with exponential backoff. A server-supplied retry-after delay takes
//! precedence over the computed backoff.

mod retry;

pub use retry::{RetryConfig, RetryExecutor, DEFAULT_MAX_RETRIES};
