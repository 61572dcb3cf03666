use azcore::{Diagnostics, OperationError, ParseError, SendError};
use thiserror::Error;

use super::common::ApiErrorDetails;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] SendError),

    #[error("API returned error (HTTP {status}): {message}")]
    ApiError {
        status: u16,
        message: String,
        #[source]
        details: Option<Box<ApiErrorDetails>>,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Too many requests, rate limited")]
    RateLimited,

    #[error("Service unavailable, retry later")]
    ServiceUnavailable,

    #[error("Invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    InvalidId(#[from] ParseError),

    #[error("Invalid request: {0}")]
    Validation(Diagnostics),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

impl ApiError {
    /// Status code reported by the service, when there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ApiError { status, .. } => Some(*status),
            ApiError::RateLimited => Some(429),
            ApiError::Operation(OperationError::OperationFailed { error, .. }) => Some(error.status),
            _ => None,
        }
    }

    /// Turns collected diagnostics into an error when any are errors
    pub fn check(diags: Diagnostics) -> Result<(), ApiError> {
        if diags.has_errors() {
            return Err(ApiError::Validation(diags));
        }
        Ok(())
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
