//! Error types used throughout stash-haptics.
//!
//! Every failure the plugin can hit maps onto a distinct variant so callers
//! can tell a fatal host outage apart from a per-scene problem or a
//! provider rate limit that should invalidate cached state.

/// Common error type for stash-haptics.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The Stash server could not be reached. Fatal to the whole run.
    #[error("Stash host unavailable: {0}")]
    HostUnavailable(String),

    /// An HTTP request failed with a non-retryable status or exhausted its
    /// retry budget.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The provider answered 429 after retries were exhausted.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The provider rejected the request outright (security block).
    #[error("Request rejected: {0}")]
    SecurityRejected(String),

    /// A payload (provider response, pattern file, plugin input) did not
    /// parse as the expected JSON shape.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The requested cache entry does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new HostUnavailable error.
    pub fn host_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::HostUnavailable(msg.into())
    }

    /// Create a new Http error.
    pub fn http<S: Into<String>>(msg: S) -> Self {
        Self::Http(msg.into())
    }

    /// Create a new MalformedPayload error.
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::MalformedPayload(msg.into())
    }

    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// True for errors that should invalidate a cached provider response so
    /// the next run re-fetches it cleanly.
    pub fn is_self_healing(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::SecurityRejected(_))
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::host_unavailable("connection refused");
        assert_eq!(
            err.to_string(),
            "Stash host unavailable: connection refused"
        );

        let err = Error::malformed("expected array");
        assert_eq!(err.to_string(), "Malformed payload: expected array");

        let err = Error::not_found("1234.json");
        assert_eq!(err.to_string(), "Not found: 1234.json");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn self_healing_classification() {
        assert!(Error::RateLimited("429".into()).is_self_healing());
        assert!(Error::SecurityRejected("403".into()).is_self_healing());
        assert!(!Error::http("500").is_self_healing());
        assert!(!Error::not_found("x").is_self_healing());
    }
}
