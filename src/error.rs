//! Error types for the pixel_sentry library

use thiserror::Error;

/// Result type alias for pixel_sentry operations
pub type Result<T> = std::result::Result<T, SentryError>;

/// Error types for detection, capture, and input operations
#[derive(Error, Debug)]
pub enum SentryError {
    /// Capture backend could not be constructed or enumerated
    #[error("Capture backend error: {message}")]
    CaptureBackend { message: String },

    /// Synthetic input backend could not be constructed
    #[error("Input backend error: {message}")]
    InputBackend { message: String },

    /// Synthetic input injection failed
    #[error("Input injection failed: {message}")]
    InputInjection { message: String },

    /// Classification or clustering computation failed
    #[error("Computation error: {message}")]
    Computation { message: String },

    /// Configuration file could not be read or written
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },
}

impl SentryError {
    /// Create a capture backend error with context
    pub fn capture(message: impl Into<String>) -> Self {
        Self::CaptureBackend {
            message: message.into(),
        }
    }

    /// Create an input injection error with context
    pub fn injection(message: impl Into<String>) -> Self {
        Self::InputInjection {
            message: message.into(),
        }
    }

    /// Create a computation error with context
    pub fn computation(message: impl Into<String>) -> Self {
        Self::Computation {
            message: message.into(),
        }
    }

    /// Create a configuration error with an underlying cause
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if this error indicates a recoverable per-tick condition
    ///
    /// Recoverable errors are reported through the result channel and the
    /// loop continues; backend construction failures prevent the loop from
    /// starting at all.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SentryError::InputInjection { .. } | SentryError::Computation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(SentryError::injection("press failed").is_recoverable());
        assert!(SentryError::computation("bad raster").is_recoverable());
        assert!(!SentryError::capture("no monitors").is_recoverable());
    }

    #[test]
    fn test_config_error_preserves_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = SentryError::config("could not read config", io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
