use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::any::Any;
use std::error::Error as StdError;

use super::codes::FailureKind;

/// Prefix of every failure body
pub const FAILURE_PREFIX: &str = "Error: ";

/// Message used when error details are hidden from clients
pub const REDACTED_MESSAGE: &str = "Internal Server Error";

const PLAIN_TEXT: &str = "text/plain;charset=UTF-8";

/// A caught downstream failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    /// What kind of failure was caught
    pub kind: FailureKind,
    /// Message text of the failure, as reported by the downstream
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Capture the top-level message of an error. Sources are not walked.
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        Self::new(FailureKind::Error, err.to_string())
    }

    /// Capture the payload of a caught panic
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());

        Self::new(FailureKind::Panic, message)
    }

    /// Same failure with its message replaced by a generic one
    pub fn redacted(self) -> Self {
        Self::new(self.kind, REDACTED_MESSAGE)
    }

    /// Body text sent to the client
    pub fn body(&self) -> String {
        format!("{}{}", FAILURE_PREFIX, self.message)
    }
}

impl From<tower::BoxError> for ErrorInfo {
    fn from(err: tower::BoxError) -> Self {
        Self::from_error(&*err)
    }
}

impl IntoResponse for ErrorInfo {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.kind.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, [(header::CONTENT_TYPE, PLAIN_TEXT)], self.body()).into_response()
    }
}
