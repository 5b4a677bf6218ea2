// ABOUTME: Docker collaborator used by the states: compose, containers, logs and exec.
// ABOUTME: DockerService backs the DockerOps trait with BollardRuntime and the compose CLI.

use crate::config::RetryPolicy;
use crate::runtime::compose::{MIN_COMPOSE_VERSION, is_supported_version};
use crate::runtime::{
    BollardRuntime, CommandOutput, Compose, ContainerError, ContainerFilters, ContainerOps,
    ContainerSummary, ExecConfig, ExecError, ExecOps, ExecResult, LogError, LogOps, LogOptions,
    LogStreamBox, NetworkError, RuntimeError, RuntimeInfo, SafeNetworkRemover, detect_local,
};
use crate::types::NetworkId;
use crate::utils::{RetryOptions, retry_task};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("Docker is not available: {0}")]
    Unavailable(String),

    #[error("container {0} is not running")]
    ContainerNotFound(String),

    #[error("failed to run docker: {0}")]
    Command(#[from] io::Error),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Logs(#[from] LogError),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

#[async_trait]
pub trait DockerOps: Send + Sync {
    /// Whether the daemon answers a ping.
    async fn check_docker(&self) -> bool;

    /// Whether `docker compose` is newer than the minimum supported release.
    async fn is_correct_compose_version(&self) -> bool;

    /// The subset of `ports` that is already bound on this host.
    async fn ports_in_use(&self, ports: &[u16]) -> Vec<u16>;

    async fn compose_up(
        &self,
        files: &[PathBuf],
        env: &[(String, String)],
    ) -> Result<CommandOutput, DockerError>;

    /// Kill the project containers, then bring the project down with volumes.
    async fn compose_stop(&self) -> Result<(), DockerError>;

    /// Remove the networks left behind by the compose project.
    async fn remove_networks(&self) -> Result<Vec<NetworkId>, DockerError>;

    async fn container(&self, name: &str) -> Result<ContainerSummary, DockerError>;

    async fn container_logs(
        &self,
        name: &str,
        opts: &LogOptions,
    ) -> Result<LogStreamBox, DockerError>;

    async fn exec(&self, name: &str, cmd: &[&str]) -> Result<ExecResult, DockerError>;
}

pub struct DockerService {
    runtime: Result<BollardRuntime, RuntimeError>,
    compose: Compose,
    retry: RetryPolicy,
}

impl DockerService {
    /// Locate the daemon socket and prepare compose for `compose_root`.
    /// A missing daemon is not an error here; it surfaces from `check_docker`.
    pub fn new(compose_root: &Path, retry: RetryPolicy) -> Self {
        let runtime = detect_local()
            .map_err(RuntimeError::from)
            .and_then(|socket| BollardRuntime::connect(&socket).map_err(RuntimeError::from));
        if let Err(e) = &runtime {
            tracing::debug!("Docker runtime unavailable: {}", e);
        }
        Self {
            runtime,
            compose: Compose::new(compose_root),
            retry,
        }
    }

    fn runtime(&self) -> Result<&BollardRuntime, DockerError> {
        self.runtime
            .as_ref()
            .map_err(|e| DockerError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl DockerOps for DockerService {
    async fn check_docker(&self) -> bool {
        match self.runtime() {
            Ok(runtime) => runtime.ping().await.is_ok(),
            Err(_) => false,
        }
    }

    async fn is_correct_compose_version(&self) -> bool {
        match self.compose.version().await {
            Ok(Some(version)) if is_supported_version(version) => true,
            Ok(Some((major, minor, patch))) => {
                let (min_major, min_minor, min_patch) = MIN_COMPOSE_VERSION;
                tracing::error!(
                    "Docker Compose {major}.{minor}.{patch} is not supported, \
                     a version newer than {min_major}.{min_minor}.{min_patch} is required"
                );
                false
            }
            Ok(None) => {
                tracing::error!("Could not determine the Docker Compose version");
                false
            }
            Err(e) => {
                tracing::error!("Could not run Docker Compose: {}", e);
                false
            }
        }
    }

    async fn ports_in_use(&self, ports: &[u16]) -> Vec<u16> {
        let mut in_use = Vec::new();
        for &port in ports {
            if let Err(e) = tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
                tracing::trace!("Port {} unavailable: {}", port, e);
                in_use.push(port);
            }
        }
        in_use
    }

    async fn compose_up(
        &self,
        files: &[PathBuf],
        env: &[(String, String)],
    ) -> Result<CommandOutput, DockerError> {
        let compose = self.compose.clone().with_env(env.to_vec());
        Ok(compose.up(files).await?)
    }

    async fn compose_stop(&self) -> Result<(), DockerError> {
        for output in [self.compose.kill().await?, self.compose.down().await?] {
            if !output.success() {
                tracing::debug!(
                    "docker compose exited with {}: {}",
                    output.exit_code,
                    output.stderr.trim()
                );
            }
        }
        Ok(())
    }

    async fn remove_networks(&self) -> Result<Vec<NetworkId>, DockerError> {
        let runtime = self.runtime()?;
        Ok(SafeNetworkRemover::new(runtime).remove_all().await?)
    }

    /// Containers may still be starting, so a missing one is retried.
    async fn container(&self, name: &str) -> Result<ContainerSummary, DockerError> {
        let runtime = self.runtime()?;
        let filters = ContainerFilters::by_name(name);
        let options = RetryOptions::new(self.retry)
            .should_retry(|e: &DockerError| matches!(e, DockerError::ContainerNotFound(_)))
            .on_retry(|attempt, _| {
                tracing::debug!("Waiting for container {} (attempt {})", name, attempt)
            });

        let filters = &filters;
        retry_task(&options, move || async move {
            runtime
                .list_containers(filters)
                .await?
                .into_iter()
                .find(|c| c.name == name)
                .ok_or_else(|| DockerError::ContainerNotFound(name.to_string()))
        })
        .await
    }

    async fn container_logs(
        &self,
        name: &str,
        opts: &LogOptions,
    ) -> Result<LogStreamBox, DockerError> {
        let container = self.container(name).await?;
        Ok(self.runtime()?.container_logs(&container.id, opts).await?)
    }

    async fn exec(&self, name: &str, cmd: &[&str]) -> Result<ExecResult, DockerError> {
        let container = self.container(name).await?;
        let config = ExecConfig::command(cmd.iter().copied());
        Ok(self.runtime()?.exec(&container.id, &config).await?)
    }
}
