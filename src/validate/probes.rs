// ABOUTME: Protocol smoke-test harness running the fixed probe sequence.
// ABOUTME: Diagnostic, not gating: failures are collected, never aborting the run.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::config::ProbeConfig;
use crate::stack::FunctionStatus;

use super::client::ProtocolClient;
use super::error::ProbeError;
use super::protocol::{CallToolResult, InitializeResult, JsonRpcRequest, ToolsListResult};

/// Function state the platform reports for a servable function.
const ACTIVE_STATE: &str = "Active";

/// Identity of one probe in the fixed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeId {
    Handshake,
    Capabilities,
    Functional,
    Infrastructure,
    Latency,
}

impl ProbeId {
    pub fn as_str(self) -> &'static str {
        match self {
            ProbeId::Handshake => "handshake",
            ProbeId::Capabilities => "capabilities",
            ProbeId::Functional => "functional",
            ProbeId::Infrastructure => "infrastructure",
            ProbeId::Latency => "latency",
        }
    }
}

impl std::fmt::Display for ProbeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Pass,
    Warn,
    Fail,
}

/// Result of one probe: outcome, detail, extracted fields, latency.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub probe: ProbeId,
    pub outcome: ProbeOutcome,
    pub detail: String,
    pub extracted: BTreeMap<String, String>,
    pub latency: Option<Duration>,
}

impl ValidationResult {
    fn pass(probe: ProbeId, detail: impl Into<String>) -> Self {
        Self {
            probe,
            outcome: ProbeOutcome::Pass,
            detail: detail.into(),
            extracted: BTreeMap::new(),
            latency: None,
        }
    }

    fn warn(probe: ProbeId, detail: impl Into<String>) -> Self {
        Self {
            probe,
            outcome: ProbeOutcome::Warn,
            detail: detail.into(),
            extracted: BTreeMap::new(),
            latency: None,
        }
    }

    fn fail(probe: ProbeId, error: &ProbeError) -> Self {
        Self {
            probe,
            outcome: ProbeOutcome::Fail,
            detail: error.to_string(),
            extracted: BTreeMap::new(),
            latency: None,
        }
    }

    fn with_field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.extracted.insert(key.to_string(), value.into());
        self
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

/// Runs the fixed probe sequence against a deployed endpoint.
///
/// Probes execute in order and block on their own round trip; a failing
/// probe is recorded and the harness proceeds to the next one.
pub struct Validator<'a, C: ProtocolClient + ?Sized, F: FunctionStatus + ?Sized> {
    client: &'a C,
    platform: &'a F,
    config: &'a ProbeConfig,
    region: &'a str,
    function_name: Option<&'a str>,
}

impl<'a, C: ProtocolClient + ?Sized, F: FunctionStatus + ?Sized> Validator<'a, C, F> {
    pub fn new(
        client: &'a C,
        platform: &'a F,
        config: &'a ProbeConfig,
        region: &'a str,
        function_name: Option<&'a str>,
    ) -> Self {
        Self {
            client,
            platform,
            config,
            region,
            function_name,
        }
    }

    /// Run every probe in the fixed order, collecting all results.
    pub async fn run_all(&self) -> Vec<ValidationResult> {
        let results = vec![
            self.handshake().await,
            self.capabilities().await,
            self.functional().await,
            self.infrastructure().await,
            self.latency().await,
        ];

        for result in &results {
            if result.outcome == ProbeOutcome::Fail {
                warn!(probe = %result.probe, detail = %result.detail, "probe failed");
            }
        }

        results
    }

    async fn handshake(&self) -> ValidationResult {
        let response = match self.client.call(&JsonRpcRequest::initialize(1)).await {
            Ok(response) => response,
            Err(e) => return ValidationResult::fail(ProbeId::Handshake, &e),
        };

        // Success requires a result object; an error object or a body
        // carrying neither is a hard failure. Only a present result with
        // unreadable server info downgrades.
        let result = match response.outcome() {
            Ok(value) => value.clone(),
            Err(e) => return ValidationResult::fail(ProbeId::Handshake, &e),
        };

        match serde_json::from_value::<InitializeResult>(result) {
            Ok(init) => ValidationResult::pass(ProbeId::Handshake, "session initialized")
                .with_field("server_name", init.server_info.name)
                .with_field("server_version", init.server_info.version),
            Err(e) => ValidationResult::warn(
                ProbeId::Handshake,
                format!("result present but server info unreadable: {e}"),
            ),
        }
    }

    async fn capabilities(&self) -> ValidationResult {
        let response = match self.client.call(&JsonRpcRequest::tools_list(2)).await {
            Ok(response) => response,
            Err(e) => return ValidationResult::fail(ProbeId::Capabilities, &e),
        };

        match response.decode::<ToolsListResult>() {
            Ok(list) => {
                let count = list.tools.len();
                let names: Vec<&str> = list.tools.iter().map(|t| t.name.as_str()).collect();
                ValidationResult::pass(
                    ProbeId::Capabilities,
                    format!("{count} operation(s) advertised"),
                )
                .with_field("tool_count", count.to_string())
                .with_field("tools", names.join(","))
            }
            Err(e) => ValidationResult::fail(ProbeId::Capabilities, &e),
        }
    }

    async fn functional(&self) -> ValidationResult {
        let request =
            JsonRpcRequest::tools_call(3, &self.config.tool, &self.config.arguments);
        let response = match self.client.call(&request).await {
            Ok(response) => response,
            Err(e) => return ValidationResult::fail(ProbeId::Functional, &e),
        };

        let call = match response.decode::<CallToolResult>() {
            Ok(call) => call,
            Err(e) => return ValidationResult::fail(ProbeId::Functional, &e),
        };

        if call.is_error {
            return ValidationResult::warn(
                ProbeId::Functional,
                format!(
                    "{} reported a tool error: {}",
                    self.config.tool,
                    call.text()
                ),
            );
        }

        // Content relevance is probabilistic: a missing keyword downgrades
        // to a warning, never a hard failure.
        let keyword = self.config.expect_keyword.to_lowercase();
        if call.text().to_lowercase().contains(&keyword) {
            ValidationResult::pass(
                ProbeId::Functional,
                format!("{} returned relevant content", self.config.tool),
            )
        } else {
            ValidationResult::warn(
                ProbeId::Functional,
                format!(
                    "{} answered but content lacks \"{}\" (limited relevance)",
                    self.config.tool, self.config.expect_keyword
                ),
            )
        }
    }

    async fn infrastructure(&self) -> ValidationResult {
        let function_name = match self.function_name {
            Some(name) => name,
            None => {
                return ValidationResult::fail(
                    ProbeId::Infrastructure,
                    &ProbeError::Malformed("function name output not available".to_string()),
                );
            }
        };

        let config = match self
            .platform
            .function_configuration(self.region, function_name)
            .await
        {
            Ok(config) => config,
            Err(e) => {
                return ValidationResult::fail(
                    ProbeId::Infrastructure,
                    &ProbeError::Transport(e.to_string()),
                );
            }
        };

        let result = if config.state == ACTIVE_STATE {
            ValidationResult::pass(ProbeId::Infrastructure, "function is active")
        } else {
            ValidationResult::fail(
                ProbeId::Infrastructure,
                &ProbeError::Malformed(format!("function state is {}", config.state)),
            )
        };

        result
            .with_field("architecture", config.architectures.join(","))
            .with_field("runtime", config.runtime)
            .with_field("memory_mb", config.memory_size.to_string())
    }

    async fn latency(&self) -> ValidationResult {
        let started = Instant::now();
        match self.client.call(&JsonRpcRequest::initialize(4)).await {
            Ok(response) => {
                let elapsed = started.elapsed();
                match response.outcome() {
                    // Observational: round-trip time only, no threshold
                    Ok(_) => ValidationResult::pass(
                        ProbeId::Latency,
                        format!("handshake round trip in {elapsed:.2?}"),
                    )
                    .with_latency(elapsed),
                    Err(e) => ValidationResult::fail(ProbeId::Latency, &e).with_latency(elapsed),
                }
            }
            Err(e) => ValidationResult::fail(ProbeId::Latency, &e),
        }
    }
}
