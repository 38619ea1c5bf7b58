//! Observability for the Gemini chat client.
//!
//! Logging goes through the [`Logger`] trait; the stream aggregation code
//! additionally emits `tracing` events directly.
//!
//! # Example
//!
//! ```rust
//! use integrations_gemini_chat::observability::{Logger, StructuredLogger};
//! use integrations_gemini_chat::config::LogLevel;
//! use serde_json::json;
//!
//! let logger = StructuredLogger::new("gemini.chat")
//!     .with_level(LogLevel::Debug);
//!
//! logger.info("Starting chat stream", json!({
//!     "model": "gemini-2.0-flash",
//!     "temperature": 0.7
//! }));
//! ```

pub mod logging;

pub use logging::{redact_sensitive_fields, DefaultLogger, Logger, NoopLogger, StructuredLogger};

/// Create the default logger: `tracing`-backed with redaction.
pub fn create_default_logger(service_name: &str) -> Box<dyn Logger> {
    Box::new(StructuredLogger::new(service_name))
}

/// Create a logger that discards everything.
pub fn create_noop_logger() -> Box<dyn Logger> {
    Box::new(NoopLogger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_loggers() {
        // Without a subscriber installed these only need to not panic.
        create_default_logger("test").info("test", json!({}));
        create_noop_logger().error("test", json!({"api_key": "k"}));
    }
}
