// ABOUTME: Shared test support: mock adapters and config fixtures.
// ABOUTME: Lets pipeline scenarios run without Docker, AWS, or a network.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;

use skylift::build::{BuildArtifact, BuildEnvironment, BuildError, BuildHandle, BuildRequest};
use skylift::config::{Config, Environment, Target};
use skylift::stack::{
    DeployRequest, DeploymentOutputs, FunctionConfiguration, FunctionStatus, Orchestrator,
    OrchestratorError, StackDescription,
};
use skylift::types::StackName;
use skylift::validate::{JsonRpcRequest, JsonRpcResponse, ProbeError};

pub fn test_config() -> Config {
    Config::from_yaml(
        r#"
service: mcp-server
reconcile:
  poll_interval: 1ms
  delete_timeout: 1s
"#,
    )
    .expect("test config should parse")
}

pub fn test_target(config: &Config) -> Target {
    config
        .resolve(Environment::Dev, Some("us-east-1"), None)
        .expect("test target should resolve")
}

// =============================================================================
// Mock orchestrator
// =============================================================================

/// Scripted orchestrator: answers `describe_stack` from a queue of raw
/// statuses and records every call in order.
pub struct MockOrchestrator {
    describe_queue: Mutex<VecDeque<Option<String>>>,
    drained_status: Option<String>,
    outputs: DeploymentOutputs,
    fail_deploy: bool,
    pub calls: Mutex<Vec<String>>,
}

impl MockOrchestrator {
    /// `statuses`: successive describe answers; `None` means absent.
    /// Once the queue drains, further describes answer absent.
    pub fn new(statuses: Vec<Option<&str>>) -> Self {
        Self {
            describe_queue: Mutex::new(
                statuses
                    .into_iter()
                    .map(|s| s.map(str::to_string))
                    .collect(),
            ),
            drained_status: None,
            outputs: deployed_outputs(),
            fail_deploy: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer every describe after the queue drains with this status.
    pub fn when_drained(mut self, status: &str) -> Self {
        self.drained_status = Some(status.to_string());
        self
    }

    pub fn with_outputs(mut self, outputs: DeploymentOutputs) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn failing_deploy(mut self) -> Self {
        self.fail_deploy = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

pub fn deployed_outputs() -> DeploymentOutputs {
    DeploymentOutputs::from_pairs([
        (
            "EndpointUrl".to_string(),
            "https://example.lambda-url.us-east-1.on.aws/mcp".to_string(),
        ),
        ("FunctionName".to_string(), "mcp-server-dev".to_string()),
    ])
}

#[async_trait]
impl Orchestrator for MockOrchestrator {
    async fn describe_stack(
        &self,
        _region: &str,
        name: &StackName,
    ) -> Result<Option<StackDescription>, OrchestratorError> {
        self.record("describe");
        let next = match self.describe_queue.lock().unwrap().pop_front() {
            Some(scripted) => scripted,
            None => self.drained_status.clone(),
        };
        Ok(next.map(|raw_status| StackDescription {
            name: name.clone(),
            raw_status,
            status_reason: None,
        }))
    }

    async fn deploy_stack(&self, _request: &DeployRequest) -> Result<(), OrchestratorError> {
        self.record("deploy");
        if self.fail_deploy {
            return Err(OrchestratorError::CommandFailed {
                command: "deploy".to_string(),
                stderr: "deploy rejected".to_string(),
            });
        }
        Ok(())
    }

    async fn delete_stack(
        &self,
        _region: &str,
        _name: &StackName,
    ) -> Result<(), OrchestratorError> {
        self.record("delete");
        Ok(())
    }

    async fn stack_outputs(
        &self,
        _region: &str,
        _name: &StackName,
    ) -> Result<DeploymentOutputs, OrchestratorError> {
        self.record("outputs");
        Ok(self.outputs.clone())
    }
}

// =============================================================================
// Mock build environment
// =============================================================================

/// Build environment that "compiles" instantly and extracts a fake binary.
pub struct MockBuildEnvironment {
    pub fail_compile: bool,
}

impl MockBuildEnvironment {
    pub fn new() -> Self {
        Self {
            fail_compile: false,
        }
    }

    pub fn failing_compile() -> Self {
        Self { fail_compile: true }
    }
}

#[async_trait]
impl BuildEnvironment for MockBuildEnvironment {
    async fn preflight(&self) -> Result<(), BuildError> {
        Ok(())
    }

    async fn compile(&self, request: &BuildRequest) -> Result<BuildHandle, BuildError> {
        if self.fail_compile {
            return Err(BuildError::CompileFailed {
                exit_code: 101,
                log: "error[E0308]: mismatched types".to_string(),
            });
        }
        Ok(BuildHandle::new(
            "mock-build",
            request.artifact_path(),
            request.binary.clone(),
            request.architecture,
        ))
    }

    async fn extract(
        &self,
        handle: &BuildHandle,
        dest_dir: &Path,
    ) -> Result<BuildArtifact, BuildError> {
        let path = dest_dir.join(handle.binary());
        std::fs::write(&path, b"\x7fELF mock binary")?;
        Ok(BuildArtifact {
            path,
            architecture: handle.architecture(),
        })
    }

    async fn release(&self, _handle: BuildHandle) -> Result<(), BuildError> {
        Ok(())
    }
}

// =============================================================================
// Mock protocol client and platform status
// =============================================================================

/// Scripted protocol client: one canned response body per method.
/// Methods without a script answer with a transport failure.
pub struct MockProtocolClient {
    responses: HashMap<String, String>,
}

impl MockProtocolClient {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
        }
    }

    pub fn respond(mut self, method: &str, body: &str) -> Self {
        self.responses.insert(method.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl skylift::validate::ProtocolClient for MockProtocolClient {
    async fn call(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, ProbeError> {
        match self.responses.get(&request.method) {
            Some(body) => {
                serde_json::from_str(body).map_err(|e| ProbeError::Malformed(e.to_string()))
            }
            None => Err(ProbeError::Transport(format!(
                "connection refused for {}",
                request.method
            ))),
        }
    }
}

/// Platform status stub reporting a fixed function configuration.
pub struct MockPlatform {
    pub state: String,
}

impl MockPlatform {
    pub fn active() -> Self {
        Self {
            state: "Active".to_string(),
        }
    }

    pub fn pending() -> Self {
        Self {
            state: "Pending".to_string(),
        }
    }
}

#[async_trait]
impl FunctionStatus for MockPlatform {
    async fn function_configuration(
        &self,
        _region: &str,
        _function_name: &str,
    ) -> Result<FunctionConfiguration, OrchestratorError> {
        Ok(FunctionConfiguration {
            state: self.state.clone(),
            architectures: vec!["arm64".to_string()],
            runtime: "provided.al2023".to_string(),
            memory_size: 512,
        })
    }
}
