use serde::{Deserialize, Serialize};
use std::fmt;

/// How a downstream continuation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The continuation resolved to an error
    Error,

    /// The continuation panicked while producing a response
    Panic,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Panic => write!(f, "panic"),
        }
    }
}

impl FailureKind {
    /// HTTP status code the boundary answers with.
    ///
    /// Every kind is flattened to 500; the kind only labels logs and metrics.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Error | Self::Panic => 500,
        }
    }

    /// Label value used for the `boundary_failures_total` metric
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Panic => "panic",
        }
    }
}
