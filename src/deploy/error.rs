// ABOUTME: Deploy-stage error types.
// ABOUTME: Failures leave remote state for the next run's reconciler to classify.

use thiserror::Error;

use crate::stack::OrchestratorError;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("deploy submission failed: {0}")]
    Submission(#[from] OrchestratorError),

    #[error("stack {stack} deployed but required output {key} is missing")]
    MissingOutput { stack: String, key: String },
}
