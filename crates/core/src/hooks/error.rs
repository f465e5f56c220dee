//! Hook error types.

use bursar_shared::AppError;
use thiserror::Error;

/// Errors raised by hook handlers and scheduled jobs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// A document event handler rejected the document.
    #[error("{doctype} {event} hook failed: {message}")]
    Handler {
        /// Document type.
        doctype: String,
        /// Event name.
        event: &'static str,
        /// Handler message.
        message: String,
    },

    /// A scheduled job failed.
    #[error("Scheduled job {name} failed: {message}")]
    Job {
        /// Job name.
        name: String,
        /// Failure message.
        message: String,
    },
}

impl From<HookError> for AppError {
    fn from(err: HookError) -> Self {
        match err {
            HookError::Handler { .. } => Self::BusinessRule(err.to_string()),
            HookError::Job { .. } => Self::Internal(err.to_string()),
        }
    }
}
