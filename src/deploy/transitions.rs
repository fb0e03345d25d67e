// ABOUTME: State transition methods for the deployment pipeline.
// ABOUTME: Each method consumes self and returns the next state on success.

use tracing::{info, warn};

use crate::build::{BuildEnvironment, BuildError, BuildRequest, Packager};
use crate::stack::{DeployRequest, Orchestrator, Reconciler, StackError};

use super::error::DeployError;
use super::pipeline::Pipeline;
use super::state::{Built, Bundled, Deployed, Initialized, Reconciled};

// =============================================================================
// Initialized -> Built
// =============================================================================

impl Pipeline<Initialized> {
    /// Compile the source tree inside the isolated build environment.
    ///
    /// Any compile error is fatal and aborts before any remote mutation.
    #[must_use = "pipeline state must be used"]
    pub async fn build<E: BuildEnvironment + ?Sized>(
        self,
        environment: &E,
    ) -> Result<Pipeline<Built>, BuildError> {
        let request = BuildRequest {
            source: self.config.source.clone(),
            binary: self.config.binary_name().to_string(),
            architecture: self.config.build.architecture,
        };

        info!(
            binary = %request.binary,
            architecture = %request.architecture,
            "compiling in build environment"
        );
        let handle = environment.compile(&request).await?;

        Ok(self.transition(Built { handle }))
    }
}

// =============================================================================
// Built -> Bundled
// =============================================================================

impl Pipeline<Built> {
    /// Copy the artifact out and wrap it in the runtime bundle.
    ///
    /// Extraction and archiving errors are fatal; no partial deploy is
    /// attempted. The build environment is released either way.
    #[must_use = "pipeline state must be used"]
    pub async fn package<E: BuildEnvironment + ?Sized>(
        self,
        environment: &E,
    ) -> Result<Pipeline<Bundled>, BuildError> {
        let packager = Packager::new(&self.config.build.staging_dir);
        let staged = packager.stage(environment, &self.state.handle).await;

        if let Err(e) = environment.release(self.state.handle.clone()).await {
            warn!("failed to release build environment: {e}");
        }

        let bundle = staged?;
        info!(archive = %bundle.archive_path.display(), "bundle staged");

        Ok(self.transition(Bundled { bundle }))
    }
}

// =============================================================================
// Bundled -> Reconciled
// =============================================================================

impl Pipeline<Bundled> {
    /// Classify the remote stack and clear the way for a deploy.
    ///
    /// A poisoned stack is deleted here, blocking until deletion is
    /// terminal. An unclassifiable status aborts the pipeline.
    #[must_use = "pipeline state must be used"]
    pub async fn reconcile<O: Orchestrator + ?Sized>(
        self,
        orchestrator: &O,
    ) -> Result<Pipeline<Reconciled>, StackError> {
        let reconciler = Reconciler::new(orchestrator, &self.config.reconcile);
        let action = reconciler
            .prepare(&self.target.region, &self.target.stack_name)
            .await?;

        let bundle = self.state.bundle.clone();
        Ok(self.transition(Reconciled { bundle, action }))
    }
}

// =============================================================================
// Reconciled -> Deployed
// =============================================================================

impl Pipeline<Reconciled> {
    /// Submit the deploy and block until the remote operation is terminal.
    ///
    /// On success the stack's named outputs are collected via structured
    /// query. On failure remote state is left for the next run's reconciler.
    #[must_use = "pipeline state must be used"]
    pub async fn submit<O: Orchestrator + ?Sized>(
        self,
        orchestrator: &O,
    ) -> Result<Pipeline<Deployed>, DeployError> {
        let request = DeployRequest {
            stack_name: self.target.stack_name.clone(),
            region: self.target.region.clone(),
            template_path: self.config.template.clone(),
            bundle_path: self.state.bundle.archive_path.clone(),
            artifact_bucket: self.target.artifact_bucket.clone(),
            parameters: self.target.parameters.clone(),
        };

        info!(stack = %request.stack_name, action = %self.state.action, "submitting deploy");
        orchestrator.deploy_stack(&request).await?;

        let outputs = orchestrator
            .stack_outputs(&self.target.region, &self.target.stack_name)
            .await?;

        let action = self.state.action;
        Ok(self.transition(Deployed { action, outputs }))
    }
}
