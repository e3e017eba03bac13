//! Error taxonomy for FDAPI calls.

use thiserror::Error;

/// Every failure the client (and the tool adapter on top of it) can surface.
#[derive(Debug, Error)]
pub enum FdapiError {
    /// Base URL missing/malformed, or the HTTP session could not be built.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// `request` was called before `start()` (or after `close()`).
    #[error("client not started; call start() first")]
    ClientNotStarted,

    /// Connect failure or timeout on every allowed attempt.
    #[error("{message}")]
    Connection { attempts: u32, message: String },

    /// HTTP status >= 400, or an undecodable JSON body on a successful response.
    #[error("{message}")]
    Response {
        status: Option<u16>,
        message: String,
        /// Seconds from a numeric `Retry-After` header, when the upstream sent one.
        retry_after: Option<u64>,
    },

    /// A 404 for a specific resource.
    #[error("{resource} '{identifier}' not found")]
    NotFound {
        resource: String,
        identifier: String,
    },

    /// A 429 from the upstream.
    #[error("rate limit exceeded{}", .retry_after.map(|s| format!(" (retry after {s}s)")).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    /// A 401/403 from the upstream.
    #[error("authentication failed: {message}")]
    Authentication { status: u16, message: String },

    /// Decoded payload does not match the entity schema.
    #[error("validation error: {0}")]
    Validation(String),

    /// Non-retryable transport failure, or the retry loop ran out without an outcome.
    #[error("request failed: {0}")]
    Request(String),
}

/// Result type alias for FDAPI operations.
pub type Result<T> = std::result::Result<T, FdapiError>;

impl FdapiError {
    /// Stable snake_case name of the error kind (used in tool error payloads).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::ClientNotStarted => "client_not_started",
            Self::Connection { .. } => "connection",
            Self::Response { .. } => "response",
            Self::NotFound { .. } => "not_found",
            Self::RateLimited { .. } => "rate_limited",
            Self::Authentication { .. } => "authentication",
            Self::Validation(_) => "validation",
            Self::Request(_) => "request",
        }
    }

    /// HTTP status associated with this error, when one is known.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => *status,
            Self::NotFound { .. } => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::Authentication { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Refine a generic response error into a resource-specific one.
    ///
    /// 404 becomes [`FdapiError::NotFound`], 429 becomes [`FdapiError::RateLimited`] and
    /// 401/403 become [`FdapiError::Authentication`]. Every other error is returned unchanged.
    #[must_use]
    pub fn for_resource(self, resource: &str, identifier: &str) -> Self {
        match self {
            Self::Response {
                status: Some(404), ..
            } => Self::NotFound {
                resource: resource.to_string(),
                identifier: identifier.to_string(),
            },
            Self::Response {
                status: Some(429),
                retry_after,
                ..
            } => Self::RateLimited { retry_after },
            Self::Response {
                status: Some(status @ (401 | 403)),
                message,
                ..
            } => Self::Authentication { status, message },
            other => other,
        }
    }
}
