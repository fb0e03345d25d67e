// ABOUTME: Deployment pipeline orchestration with the type state pattern.
// ABOUTME: Build, package, reconcile, and submit as compile-time-ordered stages.

mod error;
mod pipeline;
mod state;
mod transitions;

pub use error::DeployError;
pub use pipeline::Pipeline;
pub use state::{Built, Bundled, Deployed, Initialized, Reconciled};
