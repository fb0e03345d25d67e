// ABOUTME: Build and packaging error types.
// ABOUTME: Covers builder image, compilation, copy-out, and archiving failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("build environment unavailable: {0}")]
    EnvironmentUnavailable(String),

    #[error("failed to pull builder image {image}: {reason}")]
    ImagePullFailed { image: String, reason: String },

    #[error("compilation failed with exit code {exit_code}:\n{log}")]
    CompileFailed { exit_code: i64, log: String },

    #[error("artifact extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("artifact missing at {0} after build")]
    ArtifactMissing(String),

    #[error("packaging failed: {0}")]
    PackagingFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
