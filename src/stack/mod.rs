// ABOUTME: Stack lifecycle: status classification, reconciliation, and orchestration adapters.
// ABOUTME: The reconciler makes redeploys safe regardless of the previous run's outcome.

mod aws;
mod error;
mod orchestrator;
mod outputs;
mod reconcile;
mod status;

pub use aws::AwsCli;
pub use error::{StackError, StackErrorKind};
pub use orchestrator::{
    DeployRequest, FunctionConfiguration, FunctionStatus, Orchestrator, OrchestratorError,
    StackDescription,
};
pub use outputs::{DeploymentOutputs, OUTPUT_ENDPOINT, OUTPUT_FUNCTION_NAME};
pub use reconcile::{Reconciler, ReconcileAction, plan};
pub use status::StackState;
