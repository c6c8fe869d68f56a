//! Error types for the Sophos Central connector.

pub mod unified;

pub use unified::ErrorCategory;

use thiserror::Error;

/// Primary error type for all connector operations.
#[derive(Error, Debug)]
pub enum SophosError {
    #[error("{0}")]
    ParameterMissing(String),

    #[error("{0}")]
    InvalidFilterSyntax(String),

    #[error("Request failed with status {status}: {body}")]
    TransportFailure { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    #[error("Invalid pagination cursor: {0}")]
    InvalidCursor(String),

    #[error("Unrecognized response shape: {0}")]
    UnrecognizedResponseShape(String),

    #[error("Unsupported operation '{operation}' for resource '{resource}'")]
    UnsupportedOperation { resource: String, operation: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SophosError {
    /// Create a missing-parameter error.
    pub fn missing(message: impl Into<String>) -> Self {
        Self::ParameterMissing(message.into())
    }

    /// Create a transport failure from a non-2xx response.
    pub fn transport(status: u16, body: impl Into<String>) -> Self {
        Self::TransportFailure {
            status,
            body: body.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ParameterMissing(_)
            | Self::InvalidFilterSyntax(_)
            | Self::UnsupportedOperation { .. } => ErrorCategory::Parameter,
            Self::InvalidTokenResponse(_) => ErrorCategory::Authentication,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Configuration(_) | Self::Io(_) => ErrorCategory::Configuration,
            Self::Serialization(_) | Self::UnrecognizedResponseShape(_) | Self::InvalidCursor(_) => {
                ErrorCategory::Serialization
            }
            Self::TransportFailure { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
        }
    }

    /// Whether this error is potentially retryable.
    ///
    /// Informational only: the connector itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Timeout
                | ErrorCategory::Server
        )
    }

    /// Render the value placed under `error` in a failed item's result record.
    ///
    /// Transport failures surface the remote body, decoded as JSON when it is
    /// JSON. Everything else surfaces its message.
    pub fn item_payload(&self) -> serde_json::Value {
        match self {
            Self::TransportFailure { body, .. } if !body.trim().is_empty() => {
                serde_json::from_str(body)
                    .unwrap_or_else(|_| serde_json::Value::String(body.clone()))
            }
            other => serde_json::Value::String(other.to_string()),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SophosError>;
