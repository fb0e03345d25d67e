// ABOUTME: Packager staging the built artifact and wrapping it for the runtime.
// ABOUTME: Produces the raw executable and a zip bundle with the fixed entry name.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use super::environment::{BuildArtifact, BuildEnvironment, BuildHandle};
use super::error::BuildError;

/// Entry name the execution runtime requires inside the bundle.
/// Fixed by the runtime contract, never parameterized.
pub const BUNDLE_ENTRY_NAME: &str = "bootstrap";

/// File name of the staged archive.
pub const BUNDLE_FILENAME: &str = "function.zip";

/// The packaged artifact: raw executable plus its runtime bundle.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub artifact: BuildArtifact,
    pub archive_path: PathBuf,
}

/// Stages build output and produces the deployment bundle.
pub struct Packager {
    staging_dir: PathBuf,
}

impl Packager {
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
        }
    }

    /// Remove stale output from a previous run and recreate the staging dir.
    pub fn reset_staging(&self) -> Result<(), BuildError> {
        if self.staging_dir.exists() {
            std::fs::remove_dir_all(&self.staging_dir)?;
        }
        std::fs::create_dir_all(&self.staging_dir)?;
        Ok(())
    }

    /// Copy the artifact out of the build environment and bundle it.
    pub async fn stage<E: BuildEnvironment + ?Sized>(
        &self,
        environment: &E,
        handle: &BuildHandle,
    ) -> Result<Bundle, BuildError> {
        self.reset_staging()?;
        let artifact = environment.extract(handle, &self.staging_dir).await?;
        self.archive(artifact)
    }

    /// Wrap a staged executable in the runtime bundle.
    pub fn archive(&self, artifact: BuildArtifact) -> Result<Bundle, BuildError> {
        mark_executable(&artifact.path)?;

        let archive_path = self.staging_dir.join(BUNDLE_FILENAME);
        let mut binary = Vec::new();
        File::open(&artifact.path)?.read_to_end(&mut binary)?;

        let file = File::create(&archive_path)?;
        let mut writer = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o755);
        writer
            .start_file(BUNDLE_ENTRY_NAME, options)
            .map_err(|e| BuildError::PackagingFailed(e.to_string()))?;
        writer.write_all(&binary)?;
        writer
            .finish()
            .map_err(|e| BuildError::PackagingFailed(e.to_string()))?;

        debug!(
            archive = %archive_path.display(),
            size = binary.len(),
            "bundle written"
        );

        Ok(Bundle {
            artifact,
            archive_path,
        })
    }
}

fn mark_executable(path: &Path) -> Result<(), BuildError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms)?;
    }
    Ok(())
}
