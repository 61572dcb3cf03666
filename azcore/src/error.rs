//! Error types for azcore

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::context::Interrupted;
use crate::http::{Response, SendError};
use crate::poller::OperationStatus;

/// Errors raised while parsing a resource identifier.
///
/// Both kinds are configuration mistakes and are never worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("parsing resource ID {input:?}: {reason}")]
    MalformedIdentifier { input: String, reason: String },

    #[error("parsing resource ID {input:?}: unexpected segment {key:?} with value {value:?}")]
    UnexpectedSegment {
        input: String,
        key: String,
        value: String,
    },
}

impl ParseError {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        ParseError::MalformedIdentifier {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by a long-running operation
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("response is not a long-running operation (HTTP {status})")]
    NotAsync { status: u16 },

    #[error("polling failed: {0}")]
    Poll(#[source] SendError),

    #[error("request could not be sent: {0}")]
    Request(#[source] SendError),

    #[error("operation {operation} has not completed")]
    Incomplete { operation: String },

    #[error("operation finished with status {status}: {error}")]
    OperationFailed {
        status: OperationStatus,
        error: ServiceError,
    },

    #[error("failed to decode operation result: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("operation canceled")]
    Canceled,

    #[error("deadline exceeded while waiting for operation")]
    DeadlineExceeded,

    #[error("invalid polling URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl OperationError {
    /// Only transport-level polling failures are safe to retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, OperationError::Poll(_))
    }
}

/// Transient transport failures become [`OperationError::Poll`]; anything
/// that would fail again the same way becomes [`OperationError::Request`]
impl From<SendError> for OperationError {
    fn from(err: SendError) -> Self {
        if err.is_transient() {
            OperationError::Poll(err)
        } else {
            OperationError::Request(err)
        }
    }
}

impl From<Interrupted> for OperationError {
    fn from(reason: Interrupted) -> Self {
        match reason {
            Interrupted::Canceled => OperationError::Canceled,
            Interrupted::DeadlineExceeded => OperationError::DeadlineExceeded,
        }
    }
}

/// Error payload returned by the management API, kept verbatim in `body`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    pub status: u16,
    pub code: Option<String>,
    pub message: Option<String>,
    pub body: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl ServiceError {
    /// Builds an error from a response body in either the
    /// `{"error": {"code", "message"}}` or flat `{"code", "message"}` shape.
    pub fn from_response(response: &Response) -> Self {
        Self::from_body(response.status.as_u16(), &response.body)
    }

    pub fn from_body(status: u16, body: &str) -> Self {
        let (code, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(ErrorEnvelope {
                error: Some(inner), ..
            }) => (inner.code, inner.message),
            Ok(envelope) => (envelope.code, envelope.message),
            Err(_) => (None, None),
        };

        Self {
            status,
            code,
            message,
            body: body.to_string(),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => write!(f, "Code={:?} Message={:?}", code, message),
            (Some(code), None) => write!(f, "Code={:?}", code),
            (None, Some(message)) => write!(f, "Message={:?}", message),
            (None, None) if !self.body.trim().is_empty() => write!(f, "{}", self.body.trim()),
            (None, None) => write!(f, "HTTP {}", self.status),
        }
    }
}

impl std::error::Error for ServiceError {}
