//! Error types for OpenTix

use thiserror::Error;

use crate::claims::ClaimsError;

/// Result type alias using OpenTix Error
pub type Result<T> = std::result::Result<T, Error>;

/// OpenTix error types
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Missing or unparsable bearer token or claim
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated caller does not own the referenced record
    #[error("{0}")]
    Forbidden(String),

    /// Referenced row is absent
    #[error("{0}")]
    NotFound(String),

    /// Duplicate creation
    #[error("{0}")]
    Conflict(String),

    /// HTTP method not served by this handler
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// Postgres error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// AWS service error (S3, SNS, Secrets Manager)
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// JSON body could not be decoded
    #[error("Invalid request body: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing or invalid environment configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::Unauthorized(_) => 401,
            Error::Forbidden(_) => 403,
            Error::NotFound(_) => 404,
            Error::Conflict(_) => 409,
            Error::MethodNotAllowed => 405,
            Error::Database(_) => 500,
            Error::Upstream(_) => 500,
            Error::Serialization(_) => 400,
            Error::Config(_) => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Server-side failures hide their cause; it is logged instead.
    pub fn message(&self) -> String {
        match self {
            Error::Database(_) => "Unable to get response from database".to_string(),
            Error::Upstream(_) => "Upstream service failure".to_string(),
            Error::Config(_) | Error::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the failure was caused by the server rather than the request
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl From<ClaimsError> for Error {
    fn from(err: ClaimsError) -> Self {
        Error::Unauthorized(format!("Error retrieving wallet from token: {err}"))
    }
}
