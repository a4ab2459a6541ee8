//! Crate-level error types.
//!
//! [`SurgeError`] unifies every error source (configuration, market-data
//! feed, Telegram transport, JSON) behind a single enum so callers can
//! match on the variant they care about while still using the `?`
//! operator for easy propagation.

use std::time::Duration;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SurgeError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum SurgeError {
    /// An environment variable or settings file could not be read, parsed, or validated.
    #[error("configuration error: {0}")]
    Config(String),

    /// A WebSocket operation (connect, send, receive) failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An HTTP request to the notification transport failed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// A message from the exchange did not have the expected shape.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// The Telegram Bot API rejected a request.
    #[error("telegram error: {0}")]
    Telegram(String),

    /// The producer could not hand out a candle snapshot.
    #[error("market feed unavailable: {0}")]
    FeedUnavailable(String),

    /// No deep link can be built for this exchange, market, or symbol.
    #[error("unsupported market: {0}")]
    UnsupportedMarket(String),

    /// A notification did not complete within the dispatch timeout.
    #[error("dispatch timed out after {0:?}")]
    DispatchTimeout(Duration),

    /// A lifecycle operation was called in the wrong consumer state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// An OS-level I/O operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fails_with_io() -> Result<()> {
        Err::<(), _>(std::io::Error::other("signal handler unavailable"))?;
        Ok(())
    }

    #[test]
    fn io_errors_convert_with_question_mark() {
        let err = fails_with_io().unwrap_err();
        assert!(matches!(err, SurgeError::Io(_)));
        assert_eq!(err.to_string(), "io error: signal handler unavailable");
    }
}
