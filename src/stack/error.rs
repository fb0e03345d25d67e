// ABOUTME: Stack error types with SNAFU pattern.
// ABOUTME: Unifies orchestration and state-machine failures for programmatic handling.

use snafu::Snafu;
use std::time::Duration;

use super::orchestrator::OrchestratorError;

/// Unified stack error for orchestration and reconciliation failures.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StackError {
    #[snafu(display("orchestration request failed: {source}"))]
    Orchestration { source: OrchestratorError },

    #[snafu(display(
        "stack {name} is in unrecognized status {status}; refusing to guess an action"
    ))]
    UnclassifiedStatus { name: String, status: String },

    #[snafu(display("stack {name} was not deleted within {timeout:?}"))]
    DeleteTimeout { name: String, timeout: Duration },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackErrorKind {
    /// The orchestration service rejected or failed a request.
    Orchestration,
    /// The remote status could not be classified.
    UnclassifiedStatus,
    /// Deletion did not reach a terminal state within the deadline.
    DeleteTimeout,
}

impl StackError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> StackErrorKind {
        match self {
            StackError::Orchestration { .. } => StackErrorKind::Orchestration,
            StackError::UnclassifiedStatus { .. } => StackErrorKind::UnclassifiedStatus,
            StackError::DeleteTimeout { .. } => StackErrorKind::DeleteTimeout,
        }
    }

    /// Returns the raw remote status if this is a classification failure.
    pub fn raw_status(&self) -> Option<&str> {
        match self {
            StackError::UnclassifiedStatus { status, .. } => Some(status),
            _ => None,
        }
    }
}

impl From<OrchestratorError> for StackError {
    fn from(source: OrchestratorError) -> Self {
        StackError::Orchestration { source }
    }
}
