//! Retry with exponential backoff.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::GeminiError;

/// Default max retries.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first one.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for the computed backoff.
    pub max_delay: Duration,
    /// Backoff multiplier (2.0 doubles the delay each attempt).
    pub multiplier: f64,
    /// Jitter factor (0.0 to 1.0) applied to the computed backoff.
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl RetryConfig {
    /// A configuration that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay before the first retry.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }
}

/// Runs an operation until it succeeds, fails with a non-retryable error,
/// or runs out of retries.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Create an executor with the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// The retry configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Executes `operation`, retrying retryable failures.
    ///
    /// # Arguments
    ///
    /// * `operation` - Produces a fresh attempt each time it is called
    ///
    /// # Behavior
    ///
    /// - Only errors for which [`GeminiError::is_retryable`] holds are retried
    /// - The delay is the error's [`GeminiError::retry_after`] when present,
    ///   otherwise the jittered exponential backoff
    /// - The last error is returned once `max_retries` retries were spent
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, GeminiError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, GeminiError>>,
    {
        let mut attempts = 0;
        let mut backoff = self.config.initial_delay;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempts > 0 {
                        tracing::info!(retries = attempts, "request succeeded after retrying");
                    }
                    return Ok(result);
                }
                Err(e) if e.is_retryable() && attempts < self.config.max_retries => {
                    attempts += 1;
                    let wait = match e.retry_after() {
                        Some(retry_after) => retry_after,
                        None => self.add_jitter(backoff),
                    };

                    tracing::warn!(
                        attempt = attempts,
                        max_retries = self.config.max_retries,
                        error = %e,
                        wait = ?wait,
                        "retryable error, waiting before next attempt"
                    );

                    sleep(wait).await;

                    backoff = std::cmp::min(
                        backoff.mul_f64(self.config.multiplier.max(1.0)),
                        self.config.max_delay,
                    );
                }
                Err(e) => {
                    if attempts > 0 {
                        tracing::error!(retries = attempts, error = %e, "request failed after retrying");
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Spreads `duration` by up to +/- `jitter` of itself.
    fn add_jitter(&self, duration: Duration) -> Duration {
        use std::collections::hash_map::RandomState;
        use std::hash::BuildHasher;

        let jitter = self.config.jitter.clamp(0.0, 1.0);
        if jitter == 0.0 {
            return duration;
        }

        // RandomState is seeded per instance, which is enough spread for backoff.
        let random = RandomState::new().hash_one(duration);
        let factor = (random % 10_000) as f64 / 10_000.0;
        let range = duration.as_secs_f64() * jitter;

        Duration::from_secs_f64((duration.as_secs_f64() + factor * range * 2.0 - range).max(0.0))
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigurationError, NetworkError, RateLimitError};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn timeout() -> GeminiError {
        GeminiError::Network(NetworkError::Timeout {
            duration: Duration::from_secs(10),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_succeeds_eventually() {
        let executor = RetryExecutor::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = executor
            .execute(|| async {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(timeout())
                } else {
                    Ok("success")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausts_attempts() {
        let executor = RetryExecutor::new(RetryConfig::default().with_max_retries(2));
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<(), _> = executor
            .execute(|| async {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(timeout())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error() {
        let executor = RetryExecutor::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<(), _> = executor
            .execute(|| async {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(GeminiError::Configuration(ConfigurationError::MissingApiKey))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_is_waited_exactly() {
        let executor = RetryExecutor::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();
        let start = tokio::time::Instant::now();

        let result = executor
            .execute(|| async {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(GeminiError::RateLimit(RateLimitError::TooManyRequests {
                        retry_after: Some(Duration::from_secs(7)),
                    }))
                } else {
                    Ok("success")
                }
            })
            .await;

        assert!(result.is_ok());
        assert!(start.elapsed() >= Duration::from_secs(7));
        assert!(start.elapsed() < Duration::from_secs(8));
    }

    #[test]
    fn test_retry_config_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_delay, Duration::from_millis(1000));
        assert_eq!(config.max_delay, Duration::from_secs(60));
        assert_eq!(RetryConfig::no_retry().max_retries, 0);
    }

    #[test]
    fn test_add_jitter_stays_in_range() {
        let executor = RetryExecutor::default();
        let jittered = executor.add_jitter(Duration::from_secs(10));

        assert!(jittered >= Duration::from_secs(9));
        assert!(jittered <= Duration::from_secs(11));
    }
}
