// ABOUTME: Build and packaging stages of the pipeline.
// ABOUTME: Compiles in an isolated environment and bundles for the runtime.

mod docker;
mod environment;
mod error;
mod package;

pub use docker::DockerBuildEnvironment;
pub use environment::{
    BUILD_TARGET_DIR, BuildArtifact, BuildEnvironment, BuildHandle, BuildRequest,
};
pub use error::BuildError;
pub use package::{BUNDLE_ENTRY_NAME, BUNDLE_FILENAME, Bundle, Packager};
