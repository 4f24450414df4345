//! System errors raised while auditing a queue
//!
//! Compliance violations are not errors; see [`crate::Finding`].

use thiserror::Error;

/// Errors that fail an invocation
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Queue URL not found in event at {0}")]
    MissingQueueUrl(&'static str),

    #[error("Queue does not exist: {0}")]
    QueueNotFound(String),

    #[error("{operation} failed: {message}")]
    Collaborator {
        operation: &'static str,
        message: String,
    },

    #[error("Malformed {0} response")]
    MalformedResponse(&'static str),
}

impl GuardError {
    pub fn collaborator(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Collaborator {
            operation,
            message: message.into(),
        }
    }

    /// Error type reported to the Lambda Runtime API
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::MissingQueueUrl(_) => "SqsGuard.MissingQueueUrl",
            Self::QueueNotFound(_) => "SqsGuard.QueueNotFound",
            Self::Collaborator { .. } => "SqsGuard.Collaborator",
            Self::MalformedResponse(_) => "SqsGuard.MalformedResponse",
        }
    }
}
