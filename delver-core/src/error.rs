//! Unified error handling system
//!
//! Provides structured error types with a clear recoverable/fatal split so the
//! retry layer can decide which failures are worth another attempt.

use thiserror::Error;

pub type DelverResult<T> = Result<T, DelverError>;

/// Main error type for the Delver system
#[derive(Error, Debug)]
pub enum DelverError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Operation timeout: {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    #[error("LLM error: {message}")]
    Llm {
        message: String,
        provider: Option<String>,
    },

    #[error("Empty response from LLM")]
    EmptyResponse,

    #[error("Invalid response format: {message}")]
    InvalidResponse { message: String },

    #[error("Search error: {message}")]
    Search {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DelverError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with source
    pub fn network_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create an LLM error
    pub fn llm<S: Into<String>>(message: S) -> Self {
        Self::Llm {
            message: message.into(),
            provider: None,
        }
    }

    /// Create an invalid-response error
    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create a search error
    pub fn search<S: Into<String>>(message: S) -> Self {
        Self::Search {
            message: message.into(),
            source: None,
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Check whether a retry has a chance of succeeding.
    ///
    /// Transport-level failures (network, timeout, empty model response) are
    /// recoverable. Malformed-but-nonempty model output is not: the defect is a
    /// prompt/schema mismatch, and repeating the call will not fix it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DelverError::Network { .. }
                | DelverError::Timeout { .. }
                | DelverError::EmptyResponse
                | DelverError::Llm { .. }
        )
    }

    /// Get retry delay in milliseconds for recoverable errors
    pub fn retry_delay_ms(&self) -> Option<u64> {
        match self {
            DelverError::Network { .. } | DelverError::Llm { .. } => Some(1000),
            DelverError::Timeout { .. } => Some(2000),
            DelverError::EmptyResponse => Some(1000),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_recoverable() {
        assert!(DelverError::network("connection reset").is_recoverable());
        assert!(DelverError::EmptyResponse.is_recoverable());
        assert!(DelverError::Timeout {
            operation: "chat".to_string(),
            duration_ms: 600_000,
        }
        .is_recoverable());
    }

    #[test]
    fn malformed_output_is_fatal() {
        assert!(!DelverError::invalid_response("not json").is_recoverable());
        assert!(!DelverError::config("missing api key").is_recoverable());
    }
}
