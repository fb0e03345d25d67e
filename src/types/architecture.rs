// ABOUTME: Target CPU architecture for build and deployment.
// ABOUTME: Maps one architecture to its Docker, Rust, and Lambda identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Target architecture for the deployed function.
///
/// The build container, the produced artifact, and the Lambda function
/// configuration must all agree on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    #[default]
    Arm64,
    X86_64,
}

impl Architecture {
    /// Docker `--platform` selector for the build container.
    pub fn docker_platform(self) -> &'static str {
        match self {
            Architecture::Arm64 => "linux/arm64",
            Architecture::X86_64 => "linux/amd64",
        }
    }

    /// Rust target triple compiled inside the build container.
    pub fn target_triple(self) -> &'static str {
        match self {
            Architecture::Arm64 => "aarch64-unknown-linux-gnu",
            Architecture::X86_64 => "x86_64-unknown-linux-gnu",
        }
    }

    /// Value reported by the platform status channel.
    pub fn lambda_value(self) -> &'static str {
        match self {
            Architecture::Arm64 => "arm64",
            Architecture::X86_64 => "x86_64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lambda_value())
    }
}
