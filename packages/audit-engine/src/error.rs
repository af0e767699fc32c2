//! Typed errors for the audit engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so the server can map
//! each failure class onto its own response.

use thiserror::Error;

/// Errors that can escape the audit engine.
///
/// Provider and parse failures never appear here: they are absorbed by
/// [`crate::providers::ProviderAdapter`] and the response parser.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The subject page could not be read, so no work can proceed
    #[error("subjects unavailable: {0}")]
    SubjectsUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Batch request rejected before any work started
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl AuditError {
    /// Wrap any error as a storage failure.
    pub fn storage(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage(err.into())
    }
}

/// Errors raised by a single LLM backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No API key configured for this backend
    #[error("missing credentials for {provider}")]
    MissingCredentials { provider: String },

    /// Connection failed or was reset
    #[error("network error: {0}")]
    Network(String),

    /// The call exceeded its deadline
    #[error("timed out after {elapsed:?}")]
    Timeout { elapsed: std::time::Duration },

    /// Non-2xx response
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("unexpected response: {0}")]
    Parse(String),
}

/// Result type alias for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
