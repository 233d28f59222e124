//! Generic provider error types

use cloudspan_driver::DriverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenericError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GenericError>;

impl From<GenericError> for DriverError {
    fn from(err: GenericError) -> Self {
        match err {
            GenericError::NotFound(what) => DriverError::NotFound(what),
            GenericError::Conflict(what) => DriverError::AlreadyExists(what),
            other => DriverError::provider(other),
        }
    }
}
