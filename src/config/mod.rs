// ABOUTME: Configuration types and parsing for skylift.yml.
// ABOUTME: Handles YAML parsing, environment merging, and stack naming.

mod environment;

pub use environment::Environment;

use crate::error::{Error, Result};
use crate::types::{Architecture, StackName};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "skylift.yml";
pub const CONFIG_FILENAME_ALT: &str = "skylift.yaml";

/// Environment variable supplying the default target environment.
pub const ENV_VAR_ENVIRONMENT: &str = "SKYLIFT_ENVIRONMENT";
/// Environment variable supplying the default region.
pub const ENV_VAR_REGION: &str = "AWS_REGION";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Service name, used to derive the stack name.
    pub service: String,

    /// Path to the orchestration template, relative to the config file.
    #[serde(default = "default_template")]
    pub template: PathBuf,

    /// Path to the source tree to build, relative to the config file.
    #[serde(default = "default_source")]
    pub source: PathBuf,

    #[serde(default)]
    pub build: BuildConfig,

    /// Bucket the orchestration service stages packaged artifacts in.
    /// Defaults to `<service>-artifacts`.
    #[serde(default)]
    pub artifact_bucket: Option<String>,

    /// Template parameters common to all environments.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,

    #[serde(default)]
    pub reconcile: ReconcileConfig,

    #[serde(default)]
    pub probe: ProbeConfig,

    /// Per-environment overrides.
    #[serde(default)]
    pub environments: HashMap<Environment, EnvironmentOverrides>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct EnvironmentOverrides {
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub stack_name: Option<String>,

    #[serde(default)]
    pub artifact_bucket: Option<String>,

    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    /// Builder container image, pinned so builds are reproducible.
    #[serde(default = "default_builder_image")]
    pub image: String,

    /// Name of the compiled binary inside the source tree.
    pub binary: Option<String>,

    #[serde(default)]
    pub architecture: Architecture,

    /// Staging directory for the extracted artifact and bundle.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            image: default_builder_image(),
            binary: None,
            architecture: Architecture::default(),
            staging_dir: default_staging_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReconcileConfig {
    /// Interval between polls while waiting for stack deletion.
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Overall deadline for stack deletion before giving up.
    #[serde(default = "default_delete_timeout", with = "humantime_serde")]
    pub delete_timeout: Duration,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        ReconcileConfig {
            poll_interval: default_poll_interval(),
            delete_timeout: default_delete_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Tool exercised by the functional probe.
    #[serde(default = "default_probe_tool")]
    pub tool: String,

    /// Arguments passed to the functional probe's tool call.
    #[serde(default = "default_probe_arguments")]
    pub arguments: BTreeMap<String, String>,

    /// Keyword expected somewhere in the tool result body.
    /// Absence downgrades the probe to a warning, never a failure.
    #[serde(default = "default_probe_keyword")]
    pub expect_keyword: String,

    /// Per-request timeout for probe round trips.
    #[serde(default = "default_probe_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            tool: default_probe_tool(),
            arguments: default_probe_arguments(),
            expect_keyword: default_probe_keyword(),
            timeout: default_probe_timeout(),
        }
    }
}

fn default_template() -> PathBuf {
    PathBuf::from("template.yaml")
}

fn default_source() -> PathBuf {
    PathBuf::from(".")
}

fn default_builder_image() -> String {
    "rust:1.89".to_string()
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("target/skylift")
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_delete_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_probe_tool() -> String {
    "search".to_string()
}

fn default_probe_arguments() -> BTreeMap<String, String> {
    let mut args = BTreeMap::new();
    args.insert("query".to_string(), "rust programming".to_string());
    args
}

fn default_probe_keyword() -> String {
    "rust".to_string()
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [dir.join(CONFIG_FILENAME), dir.join(CONFIG_FILENAME_ALT)];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    fn validate(&self) -> Result<()> {
        if self.service.is_empty() {
            return Err(Error::InvalidConfig("service name cannot be empty".into()));
        }
        StackName::new(&format!("{}-{}", self.service, Environment::Dev))
            .map_err(|e| Error::InvalidConfig(format!("service name: {e}")))?;
        Ok(())
    }

    /// Resolve the effective settings for one environment.
    ///
    /// Precedence for region and stack name: CLI flag, then config override,
    /// then environment variable, then the built-in default region.
    pub fn resolve(
        &self,
        environment: Environment,
        region_flag: Option<&str>,
        stack_name_flag: Option<&str>,
    ) -> Result<Target> {
        let overrides = self.environments.get(&environment);

        let region = region_flag
            .map(str::to_string)
            .or_else(|| overrides.and_then(|o| o.region.clone()))
            .or_else(|| std::env::var(ENV_VAR_REGION).ok())
            .unwrap_or_else(|| "us-east-1".to_string());

        let stack_name = match stack_name_flag
            .map(str::to_string)
            .or_else(|| overrides.and_then(|o| o.stack_name.clone()))
        {
            Some(name) => name,
            None => format!("{}-{}", self.service, environment),
        };
        let stack_name = StackName::new(&stack_name)
            .map_err(|e| Error::InvalidConfig(format!("stack name: {e}")))?;

        let mut parameters = self.parameters.clone();
        if let Some(o) = overrides {
            for (k, v) in &o.parameters {
                parameters.insert(k.clone(), v.clone());
            }
        }
        parameters.insert("Environment".to_string(), environment.to_string());

        let artifact_bucket = overrides
            .and_then(|o| o.artifact_bucket.clone())
            .or_else(|| self.artifact_bucket.clone())
            .unwrap_or_else(|| format!("{}-artifacts", self.service));

        Ok(Target {
            environment,
            region,
            stack_name,
            artifact_bucket,
            parameters,
        })
    }

    /// Name of the binary the build produces.
    ///
    /// Defaults to the service name, which matches a single-package source
    /// tree whose package is named after the service.
    pub fn binary_name(&self) -> &str {
        self.build.binary.as_deref().unwrap_or(&self.service)
    }
}

/// Fully resolved deployment target for one pipeline run.
#[derive(Debug, Clone)]
pub struct Target {
    pub environment: Environment,
    pub region: String,
    pub stack_name: StackName,
    pub artifact_bucket: String,
    pub parameters: BTreeMap<String, String>,
}
