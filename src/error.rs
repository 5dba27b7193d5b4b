//! Error handling for the StationVis-RS application
//!
//! This module defines custom error types and a Result alias for use
//! throughout the application. The chart engine itself never returns
//! errors; these cover the fallible glue around it (HTTP, config, channels).

use thiserror::Error;

/// Main error type for StationVis-RS operations
#[derive(Error, Debug)]
pub enum StationVisError {
    /// Transport-level HTTP failures (connection refused, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The device answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// A request did not complete within its deadline
    #[error("Timeout after {timeout_ms}ms for {url}")]
    Timeout { url: String, timeout_ms: u64 },

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to channel communication
    #[error("Channel error: {0}")]
    Channel(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<StationVisError>,
    },
}

impl StationVisError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        StationVisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error (or the error it wraps) is a timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            StationVisError::Timeout { .. } => true,
            StationVisError::WithContext { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for StationVisError {
    fn from(err: serde_json::Error) -> Self {
        StationVisError::Parse(err.to_string())
    }
}

/// Result type alias for StationVis-RS operations
pub type Result<T> = std::result::Result<T, StationVisError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
