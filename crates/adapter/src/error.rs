//! Error types for the MCP adapter.

use fdapi_client::FdapiError;
use rmcp::ErrorData;
use serde_json::json;
use thiserror::Error;

/// Main error type for the adapter.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Configuration errors (missing base URL, malformed settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Startup errors (listener failed to bind, client failed to start)
    #[error("Startup error: {0}")]
    Startup(String),

    /// A tool was invoked before the adapter was started (or after it was stopped)
    #[error("FDAPI client not initialized")]
    NotInitialized,

    /// Tool arguments rejected before any upstream call
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Typed upstream failures, passed through unchanged
    #[error(transparent)]
    Fdapi(#[from] FdapiError),

    /// Anything else, carrying the original message
    #[error("{0}")]
    Other(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;

impl AdapterError {
    /// Stable snake_case kind, matching [`FdapiError::kind`] for wrapped client errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "configuration",
            Self::Startup(_) => "startup",
            Self::NotInitialized => "not_initialized",
            Self::InvalidParams(_) => "invalid_params",
            Self::Fdapi(e) => e.kind(),
            Self::Other(_) => "other",
            Self::Io(_) => "io",
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Fdapi(e) => e.status(),
            _ => None,
        }
    }
}

impl From<AdapterError> for ErrorData {
    fn from(err: AdapterError) -> Self {
        let data = Some(json!({ "kind": err.kind(), "status": err.status() }));
        let message = err.to_string();
        match err {
            AdapterError::InvalidParams(_) => Self::invalid_params(message, data),
            AdapterError::Fdapi(FdapiError::NotFound { .. }) => {
                Self::resource_not_found(message, data)
            }
            _ => Self::internal_error(message, data),
        }
    }
}
