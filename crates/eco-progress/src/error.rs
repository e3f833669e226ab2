// error.rs — Error types for the progress and achievement subsystem.

use thiserror::Error;

/// Errors that can occur while evaluating goals, achievements, or
/// dispatching notifications.
#[derive(Debug, Error)]
pub enum ProgressError {
    /// A record failed validation before any computation ran.
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// A single catalog rule could not be evaluated (non-fatal to the pass).
    #[error("rule '{key}' could not be evaluated: {reason}")]
    RuleFailed { key: String, reason: String },

    /// An achievement catalog listed the same key twice.
    #[error("duplicate achievement key '{0}'")]
    DuplicateAchievement(String),

    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },

    /// Failed to serialize/deserialize a record.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A notification sink rejected a notification (non-fatal).
    #[error("notification error: {0}")]
    NotificationError(String),
}

impl ProgressError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ProgressError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
