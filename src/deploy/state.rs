// ABOUTME: Pipeline state types for the type state pattern.
// ABOUTME: Each state carries the data the next stage provably needs.

use crate::build::{BuildHandle, Bundle};
use crate::stack::{DeploymentOutputs, ReconcileAction};

/// Initial state: configuration resolved, nothing built yet.
/// Available actions: `build()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Initialized;

/// Artifact compiled inside the build environment.
/// Available actions: `package()`
#[derive(Debug)]
pub struct Built {
    pub(crate) handle: BuildHandle,
}

/// Bundle staged on the host under the fixed runtime entry name.
/// Available actions: `reconcile()`
#[derive(Debug)]
pub struct Bundled {
    pub(crate) bundle: Bundle,
}

/// Remote state classified and cleared for a deploy.
/// Available actions: `submit()`
#[derive(Debug)]
pub struct Reconciled {
    pub(crate) bundle: Bundle,
    pub(crate) action: ReconcileAction,
}

/// Deploy reached a terminal success; named outputs collected.
#[derive(Debug)]
pub struct Deployed {
    pub(crate) action: ReconcileAction,
    pub(crate) outputs: DeploymentOutputs,
}
