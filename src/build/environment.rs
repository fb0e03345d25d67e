// ABOUTME: Build environment trait and artifact types.
// ABOUTME: Abstracts the isolated compile step so tests can run without Docker.

use crate::types::Architecture;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::BuildError;

/// Fixed directory inside the build environment holding compile output.
/// The artifact copy-out contract (`extract`) is rooted here.
pub const BUILD_TARGET_DIR: &str = "/build/target";

/// A compile request: which sources, for which architecture.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Absolute path to the source tree on the host.
    pub source: PathBuf,
    /// Name of the binary the build produces.
    pub binary: String,
    /// Target architecture; the environment must match it exactly.
    pub architecture: Architecture,
}

impl BuildRequest {
    /// Fixed in-environment path of the compiled binary.
    pub fn artifact_path(&self) -> String {
        format!(
            "{}/{}/release/{}",
            BUILD_TARGET_DIR,
            self.architecture.target_triple(),
            self.binary
        )
    }
}

/// Handle to a completed build inside the environment.
///
/// Holds what the packager needs to copy the artifact out and to release
/// the environment afterwards.
#[derive(Debug, Clone)]
pub struct BuildHandle {
    id: String,
    artifact_path: String,
    binary: String,
    architecture: Architecture,
}

impl BuildHandle {
    pub fn new(
        id: impl Into<String>,
        artifact_path: impl Into<String>,
        binary: impl Into<String>,
        architecture: Architecture,
    ) -> Self {
        Self {
            id: id.into(),
            artifact_path: artifact_path.into(),
            binary: binary.into(),
            architecture,
        }
    }

    /// Environment-specific identifier (the container ID for Docker builds).
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn artifact_path(&self) -> &str {
        &self.artifact_path
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn architecture(&self) -> Architecture {
        self.architecture
    }
}

/// A compiled executable on the host, tagged with its architecture.
#[derive(Debug, Clone)]
pub struct BuildArtifact {
    pub path: PathBuf,
    pub architecture: Architecture,
}

/// Isolated, architecture-matched compile environment.
///
/// The real implementation runs the build in a Docker container; tests
/// substitute an in-memory fake.
#[async_trait]
pub trait BuildEnvironment: Send + Sync {
    /// Verify the environment is reachable before any remote mutation.
    async fn preflight(&self) -> Result<(), BuildError>;

    /// Compile the source tree. On success the artifact exists at the
    /// request's fixed artifact path inside the environment.
    async fn compile(&self, request: &BuildRequest) -> Result<BuildHandle, BuildError>;

    /// Copy the compiled artifact out to `dest_dir` on the host.
    async fn extract(
        &self,
        handle: &BuildHandle,
        dest_dir: &Path,
    ) -> Result<BuildArtifact, BuildError>;

    /// Release the build environment's resources.
    async fn release(&self, handle: BuildHandle) -> Result<(), BuildError>;
}
