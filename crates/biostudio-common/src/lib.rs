//! # BioStudio Common
//!
//! Common error types and logging configuration shared by the Biohacking
//! Studio client-side service crates.
//!
//! ## Features
//!
//! - Unified error type with backtrace support
//! - Logging configuration and setup
//! - Result extension traits

use thiserror::Error;

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat};

/// Unified error type for the studio service layer.
#[derive(Error, Debug)]
pub enum StudioError {
    /// Network-related errors.
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Cache store errors.
    #[error("Cache error: {message}")]
    Cache {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Push payload errors.
    #[error("Push error: {message}")]
    Push {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors.
    #[error("Config error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Lifecycle state errors.
    #[error("State error: {0}")]
    State(String),

    /// I/O errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal error (unexpected).
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        backtrace: Option<backtrace::Backtrace>,
    },
}

impl StudioError {
    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with source.
    pub fn network_with_source<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
            source: None,
        }
    }

    /// Create a push error.
    pub fn push(message: impl Into<String>) -> Self {
        Self::Push {
            message: message.into(),
            source: None,
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a lifecycle state error.
    pub fn state(message: impl Into<String>) -> Self {
        Self::State(message.into())
    }

    /// Create an internal error with backtrace.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            backtrace: Some(backtrace::Backtrace::new()),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StudioError::Network { .. } | StudioError::Io(_))
    }

    /// Get the error category for metrics.
    pub fn category(&self) -> &'static str {
        match self {
            StudioError::Network { .. } => "network",
            StudioError::Cache { .. } => "cache",
            StudioError::Push { .. } => "push",
            StudioError::Config { .. } => "config",
            StudioError::State(_) => "state",
            StudioError::Io(_) => "io",
            StudioError::NotFound(_) => "not_found",
            StudioError::InvalidArgument(_) => "invalid_argument",
            StudioError::Internal { .. } => "internal",
        }
    }
}

/// Result type alias for studio operations.
pub type Result<T> = std::result::Result<T, StudioError>;

/// Extension trait for Result.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, message: impl Into<String>) -> Result<T>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| StudioError::Internal {
            message: format!("{}: {}", message.into(), e),
            backtrace: Some(backtrace::Backtrace::new()),
        })
    }
}

/// Extension trait for Option.
pub trait OptionExt<T> {
    /// Convert None to a NotFound error.
    fn ok_or_not_found(self, resource: impl Into<String>) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, resource: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| StudioError::NotFound(resource.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(StudioError::network("test").category(), "network");
        assert_eq!(StudioError::cache("test").category(), "cache");
        assert_eq!(StudioError::push("test").category(), "push");
        assert_eq!(StudioError::state("test").category(), "state");
    }

    #[test]
    fn test_retryable() {
        assert!(StudioError::network("test").is_retryable());
        assert!(!StudioError::cache("test").is_retryable());
        assert!(!StudioError::state("test").is_retryable());
    }

    #[test]
    fn test_option_ext() {
        let some: Option<i32> = Some(42);
        assert_eq!(some.ok_or_not_found("test").unwrap(), 42);

        let none: Option<i32> = None;
        assert!(matches!(
            none.ok_or_not_found("test"),
            Err(StudioError::NotFound(_))
        ));
    }

    #[test]
    fn test_context() {
        let err: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk on fire",
        ));
        let studio = err.context("reading manifest");
        assert!(matches!(studio, Err(StudioError::Internal { .. })));
    }
}
