//! Identity service error definitions

use std::fmt;

/// Identity service error types
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Service refused the submission (bad credentials, validation failure)
    Rejected(String),
    /// Service unreachable or answered with something unusable
    Transport(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Rejected(msg) => write!(f, "Submission rejected: {}", msg),
            ServiceError::Transport(msg) => write!(f, "Identity service unreachable: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
