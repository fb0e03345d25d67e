// ABOUTME: Stack reconciliation state machine.
// ABOUTME: Observes remote state and decides the safe next action, making redeploys idempotent.

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::ReconcileConfig;
use crate::types::StackName;

use super::error::StackError;
use super::orchestrator::Orchestrator;
use super::status::StackState;

/// The safe next action for a stack in a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Stack is absent: issue a create.
    Create,
    /// Stack is healthy: issue an in-place update.
    Update,
    /// Stack is poisoned: delete, wait for terminal deletion, then create.
    DeleteThenCreate,
}

impl fmt::Display for ReconcileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileAction::Create => write!(f, "create"),
            ReconcileAction::Update => write!(f, "update"),
            ReconcileAction::DeleteThenCreate => write!(f, "delete-then-create"),
        }
    }
}

/// Decide the action for an observed state.
///
/// In-place update against a poisoned stack is never planned: the platform
/// rejects it non-obviously. An unrecognized status aborts with the raw
/// status carried verbatim.
pub fn plan(name: &StackName, state: &StackState) -> Result<ReconcileAction, StackError> {
    match state {
        StackState::Absent => Ok(ReconcileAction::Create),
        StackState::Healthy => Ok(ReconcileAction::Update),
        StackState::Poisoned => Ok(ReconcileAction::DeleteThenCreate),
        StackState::Other(raw) => Err(StackError::UnclassifiedStatus {
            name: name.to_string(),
            status: raw.clone(),
        }),
    }
}

/// Inspects remote stack state and clears the way for a deploy.
pub struct Reconciler<'a, O: Orchestrator + ?Sized> {
    orchestrator: &'a O,
    poll_interval: Duration,
    delete_timeout: Duration,
}

impl<'a, O: Orchestrator + ?Sized> Reconciler<'a, O> {
    pub fn new(orchestrator: &'a O, config: &ReconcileConfig) -> Self {
        Self {
            orchestrator,
            poll_interval: config.poll_interval,
            delete_timeout: config.delete_timeout,
        }
    }

    /// Fetch the stack's current state fresh from the orchestration service.
    pub async fn observe(&self, region: &str, name: &StackName) -> Result<StackState, StackError> {
        let state = match self.orchestrator.describe_stack(region, name).await? {
            None => StackState::Absent,
            Some(description) => description.state(),
        };
        debug!(stack = %name, %state, "observed stack state");
        Ok(state)
    }

    /// Observe, plan, and perform any pre-deploy recovery.
    ///
    /// For a poisoned stack this deletes it and blocks until deletion is
    /// terminal, so the subsequent deploy is a clean create.
    pub async fn prepare(
        &self,
        region: &str,
        name: &StackName,
    ) -> Result<ReconcileAction, StackError> {
        let state = self.observe(region, name).await?;
        let action = plan(name, &state)?;
        info!(stack = %name, %state, %action, "reconcile plan");

        if action == ReconcileAction::DeleteThenCreate {
            self.orchestrator.delete_stack(region, name).await?;
            self.wait_for_deletion(region, name).await?;
        }

        Ok(action)
    }

    /// Poll until deletion reaches a terminal state, bounded by the
    /// configured deadline.
    async fn wait_for_deletion(&self, region: &str, name: &StackName) -> Result<(), StackError> {
        let deadline = Instant::now() + self.delete_timeout;

        loop {
            match self.orchestrator.describe_stack(region, name).await? {
                None => {
                    info!(stack = %name, "deletion complete");
                    return Ok(());
                }
                Some(description) => {
                    let raw = description.raw_status;
                    if raw == "DELETE_COMPLETE" {
                        info!(stack = %name, "deletion complete");
                        return Ok(());
                    }
                    if raw == "DELETE_FAILED" {
                        return Err(StackError::UnclassifiedStatus {
                            name: name.to_string(),
                            status: raw,
                        });
                    }
                    debug!(stack = %name, status = %raw, "waiting for deletion");
                }
            }

            if Instant::now() >= deadline {
                return Err(StackError::DeleteTimeout {
                    name: name.to_string(),
                    timeout: self.delete_timeout,
                });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
