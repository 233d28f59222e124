//! Driver error types

use crate::capability::ResourceKind;
use std::time::Duration;
use thiserror::Error;

/// Boxed provider-side error kept as the `source` of wrapped failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by drivers, connections and resource handlers
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Connection to {provider} failed")]
    ConnectionFailed {
        provider: String,
        #[source]
        source: BoxError,
    },

    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    #[error("Unsupported operation: {0} handler is not provided by this driver")]
    UnsupportedOperation(ResourceKind),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Translation error: {0}")]
    TranslationError(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Operation timed out after {0:?}")]
    OperationTimeout(Duration),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Provider error: {0}")]
    ProviderError(#[source] BoxError),
}

impl DriverError {
    /// Wrap a provider failure that has no more specific classification
    pub fn provider(err: impl Into<BoxError>) -> Self {
        DriverError::ProviderError(err.into())
    }

    /// Wrap a failed authentication handshake
    pub fn connection_failed(provider: impl Into<String>, err: impl Into<BoxError>) -> Self {
        DriverError::ConnectionFailed {
            provider: provider.into(),
            source: err.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DriverError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_connection_failed_keeps_source() {
        let err = DriverError::connection_failed("azure", "token endpoint returned 401");
        assert_eq!(err.to_string(), "Connection to azure failed");
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("token endpoint returned 401")
        );
    }

    #[test]
    fn test_unsupported_names_kind() {
        let err = DriverError::UnsupportedOperation(ResourceKind::Image);
        assert!(err.to_string().contains("Image"));
    }
}
