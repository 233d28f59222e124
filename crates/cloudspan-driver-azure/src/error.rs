//! Azure provider error types

use cloudspan_driver::DriverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("ARM error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Accepted response without an operation header to follow
    #[error("Missing async operation header on {0}")]
    MissingOperation(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AzureError>;

impl From<AzureError> for DriverError {
    fn from(err: AzureError) -> Self {
        match err {
            AzureError::NotFound(what) => DriverError::NotFound(what),
            AzureError::Conflict(what) => DriverError::AlreadyExists(what),
            other => DriverError::provider(other),
        }
    }
}
