// ABOUTME: Operator-facing summary of a pipeline run.
// ABOUTME: Renders stack, outputs, and probe results; no decision logic.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde_json::json;

use crate::config::Target;
use crate::stack::{DeploymentOutputs, ReconcileAction, StackState};
use crate::validate::{ProbeOutcome, ValidationResult};

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Human-friendly text
    #[default]
    Text,
    /// Single JSON document for scripting
    Json,
}

impl ReportFormat {
    /// Whether interstitial progress lines may appear on stdout.
    /// In JSON mode the report document must be the only output.
    pub fn shows_progress(self) -> bool {
        matches!(self, ReportFormat::Text)
    }
}

/// Aggregated view of one run.
pub struct Report<'a> {
    target: &'a Target,
    stack_state: Option<&'a StackState>,
    action: Option<ReconcileAction>,
    outputs: &'a DeploymentOutputs,
    results: &'a [ValidationResult],
    generated_at: DateTime<Utc>,
}

impl<'a> Report<'a> {
    pub fn new(
        target: &'a Target,
        stack_state: Option<&'a StackState>,
        action: Option<ReconcileAction>,
        outputs: &'a DeploymentOutputs,
        results: &'a [ValidationResult],
    ) -> Self {
        Self {
            target,
            stack_state,
            action,
            outputs,
            results,
            generated_at: Utc::now(),
        }
    }

    pub fn render(&self, format: ReportFormat) -> String {
        match format {
            ReportFormat::Text => self.render_text(),
            ReportFormat::Json => self.render_json(),
        }
    }

    fn render_text(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "Stack:       {} ({}, {})\n",
            self.target.stack_name, self.target.environment, self.target.region
        ));
        if let Some(state) = self.stack_state {
            out.push_str(&format!("State:       {state}\n"));
        }
        if let Some(action) = self.action {
            out.push_str(&format!("Action:      {action}\n"));
        }

        if self.outputs.is_empty() {
            out.push_str("Outputs:     (not yet deployed)\n");
        } else {
            out.push_str("Outputs:\n");
            for (key, value) in self.outputs.iter() {
                out.push_str(&format!("  {key}: {value}\n"));
            }
        }

        if !self.results.is_empty() {
            out.push_str("Validation:\n");
            for result in self.results {
                let mark = match result.outcome {
                    ProbeOutcome::Pass => "✓",
                    ProbeOutcome::Warn => "!",
                    ProbeOutcome::Fail => "✗",
                };
                out.push_str(&format!(
                    "  {mark} {:<15} {}\n",
                    result.probe.as_str(),
                    result.detail
                ));
                for (key, value) in &result.extracted {
                    out.push_str(&format!("      {key}: {value}\n"));
                }
            }
        }

        out
    }

    fn render_json(&self) -> String {
        let results: Vec<_> = self
            .results
            .iter()
            .map(|r| {
                json!({
                    "probe": r.probe.as_str(),
                    "outcome": match r.outcome {
                        ProbeOutcome::Pass => "pass",
                        ProbeOutcome::Warn => "warn",
                        ProbeOutcome::Fail => "fail",
                    },
                    "detail": r.detail,
                    "extracted": r.extracted,
                    "latency_ms": r.latency.map(|d| d.as_millis() as u64),
                })
            })
            .collect();

        let outputs: serde_json::Map<String, serde_json::Value> = self
            .outputs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();

        let doc = json!({
            "generated_at": self.generated_at.to_rfc3339(),
            "stack": self.target.stack_name.as_str(),
            "environment": self.target.environment.as_str(),
            "region": self.target.region,
            "state": self.stack_state.map(|s| s.to_string()),
            "action": self.action.map(|a| a.to_string()),
            "outputs": outputs,
            "validation": results,
        });

        serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".to_string())
    }
}
