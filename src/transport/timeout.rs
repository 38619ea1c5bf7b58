//! Idle timeout for streamed bodies.

use futures::StreamExt;
use std::time::Duration;

use super::error::TransportError;
use super::http::ChunkedStream;

/// Fails the stream with [`TransportError::Timeout`] when no item arrives
/// within `idle` of the previous one.
///
/// The inner stream is dropped as soon as the timeout fires, which closes
/// the underlying connection. Nothing is yielded after the timeout error.
pub fn with_idle_timeout(inner: ChunkedStream, idle: Duration) -> ChunkedStream {
    Box::pin(futures::stream::unfold(Some(inner), move |state| async move {
        let mut inner = state?;
        match tokio::time::timeout(idle, inner.next()).await {
            Ok(Some(item)) => Some((item, Some(inner))),
            Ok(None) => None,
            Err(_) => {
                tracing::debug!(idle_ms = saturating_millis(idle), "stream idle timeout elapsed");
                Some((Err(TransportError::Timeout(idle)), None))
            }
        }
    }))
}

/// Milliseconds in `duration`, saturating at `u64::MAX`.
fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
