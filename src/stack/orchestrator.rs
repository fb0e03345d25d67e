// ABOUTME: Orchestration-service contract traits and request/response types.
// ABOUTME: Abstracts stack lifecycle and function status so tests need no cloud.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::StackName;

use super::outputs::DeploymentOutputs;
use super::status::StackState;

/// Errors from the orchestration service adapter.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },

    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("unexpected response from orchestration service: {0}")]
    InvalidResponse(String),
}

/// Observed description of a named stack.
#[derive(Debug, Clone)]
pub struct StackDescription {
    pub name: StackName,
    pub raw_status: String,
    pub status_reason: Option<String>,
}

impl StackDescription {
    pub fn state(&self) -> StackState {
        StackState::classify(&self.raw_status)
    }
}

/// A deploy submission: template, bundle, and parameters for one stack.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub stack_name: StackName,
    pub region: String,
    pub template_path: PathBuf,
    pub bundle_path: PathBuf,
    pub artifact_bucket: String,
    pub parameters: BTreeMap<String, String>,
}

/// Stack lifecycle operations offered by the orchestration service.
///
/// `deploy_stack` blocks until the remote operation reaches a terminal
/// state, and must treat an empty diff as success. `delete_stack` only
/// initiates deletion; the reconciler polls `describe_stack` until the
/// deletion is terminal.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Describe the current state of a stack. `None` means absent.
    async fn describe_stack(
        &self,
        region: &str,
        name: &StackName,
    ) -> Result<Option<StackDescription>, OrchestratorError>;

    /// Submit a create-or-update and block to a terminal state.
    async fn deploy_stack(&self, request: &DeployRequest) -> Result<(), OrchestratorError>;

    /// Initiate stack deletion.
    async fn delete_stack(&self, region: &str, name: &StackName)
    -> Result<(), OrchestratorError>;

    /// Structured query of the stack's named outputs.
    async fn stack_outputs(
        &self,
        region: &str,
        name: &StackName,
    ) -> Result<DeploymentOutputs, OrchestratorError>;
}

/// Runtime configuration of a deployed function, from the platform's
/// status channel rather than the application protocol.
#[derive(Debug, Clone)]
pub struct FunctionConfiguration {
    pub state: String,
    pub architectures: Vec<String>,
    pub runtime: String,
    pub memory_size: u64,
}

/// The platform's own function-status query.
#[async_trait]
pub trait FunctionStatus: Send + Sync {
    async fn function_configuration(
        &self,
        region: &str,
        function_name: &str,
    ) -> Result<FunctionConfiguration, OrchestratorError>;
}
