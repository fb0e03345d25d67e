// ABOUTME: AWS CLI adapter implementing the orchestration-service contract.
// ABOUTME: Shells out to aws cloudformation/lambda and decodes JSON responses.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::types::StackName;

use super::orchestrator::{
    DeployRequest, FunctionConfiguration, FunctionStatus, Orchestrator, OrchestratorError,
    StackDescription,
};
use super::outputs::DeploymentOutputs;

const PACKAGED_TEMPLATE: &str = "packaged.yaml";

/// Orchestration adapter backed by the `aws` command-line tool.
pub struct AwsCli {
    bin: String,
}

impl Default for AwsCli {
    fn default() -> Self {
        Self::new()
    }
}

impl AwsCli {
    pub fn new() -> Self {
        Self {
            bin: "aws".to_string(),
        }
    }

    /// Verify the CLI exists and credentials resolve, before any mutation.
    pub async fn preflight(&self) -> Result<(), OrchestratorError> {
        self.run(&["--version"]).await?;
        self.run(&["sts", "get-caller-identity", "--output", "json"])
            .await?;
        Ok(())
    }

    async fn run(&self, args: &[&str]) -> Result<String, OrchestratorError> {
        debug!(tool = %self.bin, ?args, "running orchestration command");

        let output = Command::new(&self.bin)
            .args(args)
            .output()
            .await
            .map_err(|source| OrchestratorError::Spawn {
                tool: self.bin.clone(),
                source,
            })?;

        if !output.status.success() {
            let command = format!("{} {}", self.bin, args.join(" "));
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(OrchestratorError::CommandFailed { command, stderr });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn describe(
        &self,
        region: &str,
        name: &StackName,
    ) -> Result<Option<StackJson>, OrchestratorError> {
        let result = self
            .run(&[
                "cloudformation",
                "describe-stacks",
                "--region",
                region,
                "--stack-name",
                name.as_str(),
                "--output",
                "json",
            ])
            .await;

        let stdout = match result {
            Ok(stdout) => stdout,
            // Absent stacks are an expected answer, not a failure
            Err(OrchestratorError::CommandFailed { stderr, .. })
                if stderr.contains("does not exist") =>
            {
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let response: DescribeStacksJson = serde_json::from_str(&stdout)
            .map_err(|e| OrchestratorError::InvalidResponse(e.to_string()))?;
        Ok(response.stacks.into_iter().next())
    }
}

#[async_trait]
impl Orchestrator for AwsCli {
    async fn describe_stack(
        &self,
        region: &str,
        name: &StackName,
    ) -> Result<Option<StackDescription>, OrchestratorError> {
        let stack = match self.describe(region, name).await? {
            None => return Ok(None),
            Some(stack) => stack,
        };

        Ok(Some(StackDescription {
            name: name.clone(),
            raw_status: stack.stack_status,
            status_reason: stack.stack_status_reason,
        }))
    }

    async fn deploy_stack(&self, request: &DeployRequest) -> Result<(), OrchestratorError> {
        if !request.bundle_path.exists() {
            return Err(OrchestratorError::InvalidResponse(format!(
                "bundle not staged at {}",
                request.bundle_path.display()
            )));
        }

        // Upload local artifacts referenced by the template, rewriting their
        // locations into a packaged template next to the bundle.
        let staging_dir = request
            .bundle_path
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."));
        let packaged = staging_dir.join(PACKAGED_TEMPLATE);
        let template = request.template_path.display().to_string();
        let packaged_str = packaged.display().to_string();

        self.run(&[
            "cloudformation",
            "package",
            "--region",
            &request.region,
            "--template-file",
            &template,
            "--s3-bucket",
            &request.artifact_bucket,
            "--output-template-file",
            &packaged_str,
        ])
        .await?;

        let mut args: Vec<String> = vec![
            "cloudformation".into(),
            "deploy".into(),
            "--region".into(),
            request.region.clone(),
            "--template-file".into(),
            packaged_str,
            "--stack-name".into(),
            request.stack_name.to_string(),
            "--capabilities".into(),
            "CAPABILITY_IAM".into(),
            // An empty diff is a successful no-op, not a failure
            "--no-fail-on-empty-changeset".into(),
        ];
        if !request.parameters.is_empty() {
            args.push("--parameter-overrides".into());
            for (key, value) in &request.parameters {
                args.push(format!("{key}={value}"));
            }
        }

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&arg_refs).await?;

        info!(stack = %request.stack_name, "deploy reached terminal state");
        Ok(())
    }

    async fn delete_stack(
        &self,
        region: &str,
        name: &StackName,
    ) -> Result<(), OrchestratorError> {
        self.run(&[
            "cloudformation",
            "delete-stack",
            "--region",
            region,
            "--stack-name",
            name.as_str(),
        ])
        .await?;
        Ok(())
    }

    async fn stack_outputs(
        &self,
        region: &str,
        name: &StackName,
    ) -> Result<DeploymentOutputs, OrchestratorError> {
        let stack = match self.describe(region, name).await? {
            None => return Ok(DeploymentOutputs::default()),
            Some(stack) => stack,
        };

        Ok(DeploymentOutputs::from_pairs(
            stack
                .outputs
                .into_iter()
                .map(|o| (o.output_key, o.output_value)),
        ))
    }
}

#[async_trait]
impl FunctionStatus for AwsCli {
    async fn function_configuration(
        &self,
        region: &str,
        function_name: &str,
    ) -> Result<FunctionConfiguration, OrchestratorError> {
        let stdout = self
            .run(&[
                "lambda",
                "get-function-configuration",
                "--region",
                region,
                "--function-name",
                function_name,
                "--output",
                "json",
            ])
            .await?;

        let config: FunctionConfigurationJson = serde_json::from_str(&stdout)
            .map_err(|e| OrchestratorError::InvalidResponse(e.to_string()))?;

        Ok(FunctionConfiguration {
            state: config.state,
            architectures: config.architectures,
            runtime: config.runtime,
            memory_size: config.memory_size,
        })
    }
}

// JSON shapes returned by the aws CLI

#[derive(Debug, Deserialize)]
struct DescribeStacksJson {
    #[serde(rename = "Stacks")]
    stacks: Vec<StackJson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StackJson {
    stack_status: String,
    #[serde(default)]
    stack_status_reason: Option<String>,
    #[serde(default)]
    outputs: Vec<OutputJson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OutputJson {
    output_key: String,
    output_value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FunctionConfigurationJson {
    state: String,
    #[serde(default)]
    architectures: Vec<String>,
    runtime: String,
    memory_size: u64,
}
