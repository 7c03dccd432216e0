//! Top-level error taxonomy shared across the engine.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur anywhere in the ingest/transform/enrich/dashboard
/// pipeline.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    /// A worker pool was asked to start with too few threads.
    #[error("too few worker threads: requested {requested}, minimum is {minimum}")]
    InsufficientThreads { requested: usize, minimum: usize },

    /// The enrichment queue rejected a plate because it was full.
    #[error("enrichment queue is full (capacity {capacity})")]
    EnrichmentQueueFull { capacity: usize },

    /// A cycle batch referenced a highway not present in the registry and
    /// could not be auto-registered.
    #[error("unknown highway: {name}")]
    UnknownHighway { name: String },

    /// The file-drop transport's watched directory is unusable.
    #[error("transport directory error at {path}: {source}")]
    TransportDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A transport byte stream was malformed.
    #[error("malformed transport record: {0}")]
    MalformedRecord(String),

    /// Generic I/O failure.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON encode/decode failure on the RPC transport.
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

/// Result type used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_via_from() {
        let err: EngineError = ConfigError::FileNotFound.into();
        assert!(matches!(err, EngineError::Config { .. }));
    }

    #[test]
    fn displays_human_readable_message() {
        let err = EngineError::EnrichmentQueueFull { capacity: 64 };
        assert_eq!(err.to_string(), "enrichment queue is full (capacity 64)");
    }
}
