//! Structured logging for the Gemini chat client.
//!
//! Provides trait-based logging with structured field support.

use serde_json::Value;
use crate::config::LogLevel;

const REDACTED: &str = "***REDACTED***";

const SENSITIVE_KEYS: [&str; 11] = [
    "api_key", "apiKey", "key",
    "token", "access_token", "accessToken",
    "secret", "password", "credential",
    "authorization", "x-goog-api-key",
];

/// Logger trait for structured logging.
///
/// Implementations can integrate with various logging backends. The chat
/// model only logs through this trait.
pub trait Logger: Send + Sync {
    /// Log a debug message with structured context.
    fn debug(&self, message: &str, fields: Value);

    /// Log an info message with structured context.
    fn info(&self, message: &str, fields: Value);

    /// Log a warning message with structured context.
    fn warn(&self, message: &str, fields: Value);

    /// Log an error message with structured context.
    fn error(&self, message: &str, fields: Value);
}

/// Structured logger emitting `tracing` events.
///
/// Sensitive fields are redacted before the event is emitted.
pub struct StructuredLogger {
    name: String,
    level: LogLevel,
}

impl StructuredLogger {
    /// Create a new structured logger with the given name.
    ///
    /// # Example
    /// ```
    /// use integrations_gemini_chat::observability::StructuredLogger;
    ///
    /// let logger = StructuredLogger::new("gemini.chat");
    /// ```
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            level: LogLevel::Info,
        }
    }

    /// Set the minimum log level for this logger.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    fn should_log(&self, level: LogLevel) -> bool {
        level >= self.level
    }
}

/// Redact sensitive fields, recursing into nested objects and arrays.
pub fn redact_sensitive_fields(mut fields: Value) -> Value {
    match &mut fields {
        Value::Object(obj) => {
            for (key, value) in obj.iter_mut() {
                if SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key)) {
                    *value = Value::String(REDACTED.to_string());
                } else {
                    *value = redact_sensitive_fields(value.take());
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                *item = redact_sensitive_fields(item.take());
            }
        }
        _ => {}
    }
    fields
}

impl Logger for StructuredLogger {
    fn debug(&self, message: &str, fields: Value) {
        if !self.should_log(LogLevel::Debug) {
            return;
        }

        let redacted_fields = redact_sensitive_fields(fields);
        tracing::debug!(
            logger = %self.name,
            fields = %redacted_fields,
            "{}", message
        );
    }

    fn info(&self, message: &str, fields: Value) {
        if !self.should_log(LogLevel::Info) {
            return;
        }

        let redacted_fields = redact_sensitive_fields(fields);
        tracing::info!(
            logger = %self.name,
            fields = %redacted_fields,
            "{}", message
        );
    }

    fn warn(&self, message: &str, fields: Value) {
        if !self.should_log(LogLevel::Warn) {
            return;
        }

        let redacted_fields = redact_sensitive_fields(fields);
        tracing::warn!(
            logger = %self.name,
            fields = %redacted_fields,
            "{}", message
        );
    }

    fn error(&self, message: &str, fields: Value) {
        if !self.should_log(LogLevel::Error) {
            return;
        }

        let redacted_fields = redact_sensitive_fields(fields);
        tracing::error!(
            logger = %self.name,
            fields = %redacted_fields,
            "{}", message
        );
    }
}

/// Logger writing to stderr, for development.
pub struct DefaultLogger {
    prefix: String,
    level: LogLevel,
}

impl DefaultLogger {
    /// Creates a new default logger.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            level: LogLevel::Info,
        }
    }

    /// Set the minimum log level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    fn should_log(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    fn emit(&self, level: LogLevel, label: &str, message: &str, context: Value) {
        if self.should_log(level) {
            eprintln!("[{}] {}: {} {}", self.prefix, label, message, redact_sensitive_fields(context));
        }
    }
}

impl Logger for DefaultLogger {
    fn debug(&self, message: &str, context: Value) {
        self.emit(LogLevel::Debug, "DEBUG", message, context);
    }

    fn info(&self, message: &str, context: Value) {
        self.emit(LogLevel::Info, "INFO", message, context);
    }

    fn warn(&self, message: &str, context: Value) {
        self.emit(LogLevel::Warn, "WARN", message, context);
    }

    fn error(&self, message: &str, context: Value) {
        self.emit(LogLevel::Error, "ERROR", message, context);
    }
}

/// Logger that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn debug(&self, _message: &str, _fields: Value) {}
    fn info(&self, _message: &str, _fields: Value) {}
    fn warn(&self, _message: &str, _fields: Value) {}
    fn error(&self, _message: &str, _fields: Value) {}
}
