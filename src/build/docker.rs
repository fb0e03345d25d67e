// ABOUTME: Docker-based build environment implementation using bollard.
// ABOUTME: Compiles in an architecture-matched container and copies the artifact out.

use async_trait::async_trait;
use bollard::Docker;
use bollard::models::{ContainerCreateBody, HostConfig};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, DownloadFromContainerOptions, LogsOptions,
    RemoveContainerOptions, StartContainerOptions, WaitContainerOptions,
};
use futures::StreamExt;
use std::path::Path;
use tracing::{debug, warn};

use super::environment::{BUILD_TARGET_DIR, BuildArtifact, BuildEnvironment, BuildHandle, BuildRequest};
use super::error::BuildError;

const DEFAULT_SOCKET: &str = "/var/run/docker.sock";

/// Lines of build log surfaced on compile failure.
const FAILURE_LOG_TAIL: &str = "200";

fn map_connect_error(e: bollard::errors::Error) -> BuildError {
    BuildError::EnvironmentUnavailable(e.to_string())
}

fn map_create_error(e: bollard::errors::Error, image: &str) -> BuildError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => BuildError::ImagePullFailed {
            image: image.to_string(),
            reason: message.clone(),
        },
        _ => BuildError::EnvironmentUnavailable(e.to_string()),
    }
}

/// Build environment backed by a local Docker daemon.
///
/// The source tree is bind-mounted read-only at `/src`; compile output goes
/// to a container-internal target directory so nothing leaks back into the
/// host tree except through the explicit copy-out.
pub struct DockerBuildEnvironment {
    client: Docker,
    builder_image: String,
}

impl DockerBuildEnvironment {
    pub fn new(client: Docker, builder_image: impl Into<String>) -> Self {
        Self {
            client,
            builder_image: builder_image.into(),
        }
    }

    /// Connect to the local Docker daemon on the default socket.
    pub fn connect(builder_image: impl Into<String>) -> Result<Self, BuildError> {
        let client = Docker::connect_with_unix(DEFAULT_SOCKET, 120, bollard::API_DEFAULT_VERSION)
            .map_err(map_connect_error)?;
        Ok(Self::new(client, builder_image))
    }

    async fn pull_builder_image(&self, platform: &str) -> Result<(), BuildError> {
        let opts = CreateImageOptions {
            from_image: Some(self.builder_image.clone()),
            platform: platform.to_string(),
            ..Default::default()
        };

        // Pull returns a stream of progress updates - consume it
        let mut stream = self.client.create_image(Some(opts), None, None);
        while let Some(result) = stream.next().await {
            result.map_err(|e| BuildError::ImagePullFailed {
                image: self.builder_image.clone(),
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }

    async fn collect_build_log(&self, container_id: &str) -> String {
        let opts = LogsOptions {
            stdout: true,
            stderr: true,
            tail: FAILURE_LOG_TAIL.to_string(),
            ..Default::default()
        };

        let mut stream = self.client.logs(container_id, Some(opts));
        let mut log = String::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(output) => log.push_str(&String::from_utf8_lossy(&output.into_bytes())),
                Err(e) => {
                    warn!("failed to read build log: {e}");
                    break;
                }
            }
        }
        log
    }
}

#[async_trait]
impl BuildEnvironment for DockerBuildEnvironment {
    async fn preflight(&self) -> Result<(), BuildError> {
        self.client.ping().await.map_err(map_connect_error)?;
        Ok(())
    }

    async fn compile(&self, request: &BuildRequest) -> Result<BuildHandle, BuildError> {
        let platform = request.architecture.docker_platform();
        self.pull_builder_image(platform).await?;

        let source = request.source.canonicalize()?;
        let triple = request.architecture.target_triple();

        let body = ContainerCreateBody {
            image: Some(self.builder_image.clone()),
            cmd: Some(vec![
                "cargo".to_string(),
                "build".to_string(),
                "--release".to_string(),
                "--target".to_string(),
                triple.to_string(),
            ]),
            env: Some(vec![format!("CARGO_TARGET_DIR={BUILD_TARGET_DIR}")]),
            working_dir: Some("/src".to_string()),
            host_config: Some(HostConfig {
                binds: Some(vec![format!("{}:/src:ro", source.display())]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let opts = CreateContainerOptions {
            platform: platform.to_string(),
            ..Default::default()
        };

        let response = self
            .client
            .create_container(Some(opts), body)
            .await
            .map_err(|e| map_create_error(e, &self.builder_image))?;
        let container_id = response.id;

        debug!(container = %container_id, %triple, "starting build container");

        self.client
            .start_container(&container_id, None::<StartContainerOptions>)
            .await
            .map_err(map_connect_error)?;

        // Block until the compile reaches a terminal state
        let mut wait = self
            .client
            .wait_container(&container_id, None::<WaitContainerOptions>);
        let exit_code = match wait.next().await {
            Some(Ok(status)) => status.status_code,
            Some(Err(bollard::errors::Error::DockerContainerWaitError { code, .. })) => code,
            Some(Err(e)) => return Err(BuildError::EnvironmentUnavailable(e.to_string())),
            None => {
                return Err(BuildError::EnvironmentUnavailable(
                    "build container wait stream ended without a status".to_string(),
                ));
            }
        };

        if exit_code != 0 {
            let log = self.collect_build_log(&container_id).await;
            let _ = self
                .client
                .remove_container(
                    &container_id,
                    Some(RemoveContainerOptions {
                        force: true,
                        ..Default::default()
                    }),
                )
                .await;
            return Err(BuildError::CompileFailed { exit_code, log });
        }

        Ok(BuildHandle::new(
            container_id,
            request.artifact_path(),
            request.binary.clone(),
            request.architecture,
        ))
    }

    async fn extract(
        &self,
        handle: &BuildHandle,
        dest_dir: &Path,
    ) -> Result<BuildArtifact, BuildError> {
        let opts = DownloadFromContainerOptions {
            path: handle.artifact_path().to_string(),
        };

        // The copy-out arrives as a tar stream containing the single binary
        let mut stream = self
            .client
            .download_from_container(handle.id(), Some(opts));
        let mut archive_bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| BuildError::ArtifactMissing(format!(
                    "{}: {e}",
                    handle.artifact_path()
                )))?;
            archive_bytes.extend_from_slice(&chunk);
        }

        let dest = dest_dir.join(handle.binary());
        let mut archive = tar::Archive::new(archive_bytes.as_slice());
        let mut found = false;
        for entry in archive
            .entries()
            .map_err(|e| BuildError::ExtractionFailed(e.to_string()))?
        {
            let mut entry = entry.map_err(|e| BuildError::ExtractionFailed(e.to_string()))?;
            let name = entry
                .path()
                .map_err(|e| BuildError::ExtractionFailed(e.to_string()))?
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
            if name.as_deref() == Some(handle.binary()) {
                entry
                    .unpack(&dest)
                    .map_err(|e| BuildError::ExtractionFailed(e.to_string()))?;
                found = true;
            }
        }

        if !found {
            return Err(BuildError::ArtifactMissing(handle.artifact_path().to_string()));
        }

        Ok(BuildArtifact {
            path: dest,
            architecture: handle.architecture(),
        })
    }

    async fn release(&self, handle: BuildHandle) -> Result<(), BuildError> {
        self.client
            .remove_container(
                handle.id(),
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await
            .map_err(|e| BuildError::EnvironmentUnavailable(e.to_string()))?;
        Ok(())
    }
}
