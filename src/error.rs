// ABOUTME: Application-wide error types for skylift.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("build failed: {0}")]
    Build(#[from] crate::build::BuildError),

    #[error(transparent)]
    Stack(#[from] crate::stack::StackError),

    #[error("deploy failed: {0}")]
    Deploy(#[from] crate::deploy::DeployError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
