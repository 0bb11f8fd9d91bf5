use axum::response::{IntoResponse, Response};

use crate::errors::ErrorInfo;

/// Result of running a continuation once
#[derive(Debug)]
pub enum Outcome {
    Success(Response),
    Failure(ErrorInfo),
}

impl<E> From<Result<Response, E>> for Outcome
where
    E: Into<ErrorInfo>,
{
    fn from(result: Result<Response, E>) -> Self {
        match result {
            Ok(response) => Self::Success(response),
            Err(err) => Self::Failure(err.into()),
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Self::Success(response) => response,
            Self::Failure(info) => info.into_response(),
        }
    }
}

/// Map an outcome to the response sent to the client
pub fn translate(outcome: Outcome) -> Response {
    outcome.into_response()
}
