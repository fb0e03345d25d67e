// ABOUTME: Generic pipeline struct parameterized by state marker.
// ABOUTME: State types carry their own data for compile-time guarantees.

use crate::build::Bundle;
use crate::config::{Config, Target};
use crate::stack::{DeploymentOutputs, OUTPUT_ENDPOINT, ReconcileAction};

use super::error::DeployError;
use super::state::{Bundled, Deployed, Initialized, Reconciled};

/// A pipeline run in progress, parameterized by its current state.
///
/// The state type parameter `S` carries stage-specific data (the build
/// handle, the staged bundle, the collected outputs) directly in the state
/// type, so a stage's inputs provably exist when it runs.
#[derive(Debug)]
pub struct Pipeline<S> {
    pub(crate) config: Config,
    pub(crate) target: Target,
    pub(crate) state: S,
}

impl Pipeline<Initialized> {
    pub fn new(config: Config, target: Target) -> Self {
        Pipeline {
            config,
            target,
            state: Initialized,
        }
    }
}

impl<S> Pipeline<S> {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Internal helper to transition to a new state.
    pub(crate) fn transition<T>(self, state: T) -> Pipeline<T> {
        Pipeline {
            config: self.config,
            target: self.target,
            state,
        }
    }
}

impl Pipeline<Bundled> {
    pub fn bundle(&self) -> &Bundle {
        &self.state.bundle
    }
}

impl Pipeline<Reconciled> {
    pub fn action(&self) -> ReconcileAction {
        self.state.action
    }
}

impl Pipeline<Deployed> {
    pub fn action(&self) -> ReconcileAction {
        self.state.action
    }

    pub fn outputs(&self) -> &DeploymentOutputs {
        &self.state.outputs
    }

    /// The deployed endpoint; required before any validation probe runs.
    pub fn endpoint(&self) -> Result<&str, DeployError> {
        self.state
            .outputs
            .endpoint()
            .ok_or_else(|| DeployError::MissingOutput {
                stack: self.target.stack_name.to_string(),
                key: OUTPUT_ENDPOINT.to_string(),
            })
    }
}
