//! GCP provider error types

use cloudspan_driver::DriverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GcpError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("GCP API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Invalid service account key: {0}")]
    InvalidServiceAccount(String),

    #[error("JWT signing failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GcpError>;

impl From<GcpError> for DriverError {
    fn from(err: GcpError) -> Self {
        match err {
            GcpError::NotFound(what) => DriverError::NotFound(what),
            GcpError::Conflict(what) => DriverError::AlreadyExists(what),
            other => DriverError::provider(other),
        }
    }
}
