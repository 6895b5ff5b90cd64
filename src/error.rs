//! Error types for the bridge

use thiserror::Error;

/// Main error type for the bridge
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (invalid pattern, malformed step table)
    ///
    /// Raised at engine construction or on first use of a lazily built
    /// component. Fatal for the engine instance, never retried internally.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The backend could not be reached or gave no usable answer
    ///
    /// Covers failed query dispatch and failed version probes. Safe for the
    /// caller to retry; a failed version probe is not cached.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend answered with a shape no known protocol version produces
    ///
    /// Not retryable. Usually means the backend runs a version this bridge
    /// does not support yet.
    #[error("Backend protocol error: {0}")]
    BackendProtocol(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Configuration("bad step table".to_string());
        assert!(err.to_string().contains("bad step table"));

        let err = Error::BackendUnavailable("connection refused".to_string());
        assert!(err.to_string().contains("Backend unavailable"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
