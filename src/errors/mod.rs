//! Failure values produced at the error boundary

pub mod codes;
pub mod response;

pub use codes::FailureKind;
pub use response::{ErrorInfo, FAILURE_PREFIX};
