// ABOUTME: The runtime capability traits implemented over bollard.
// ABOUTME: Talks to the Docker Engine API on the detected unix socket.

use crate::runtime::traits::sealed::Sealed;
use crate::runtime::traits::{
    ContainerError, ContainerFilters, ContainerOps, ContainerSummary, ExecConfig, ExecError,
    ExecOps, ExecResult, LogError, LogLine, LogOps, LogOptions, LogStream, LogStreamBox,
    NetworkError, NetworkOps, NetworkSummary, RuntimeInfo, RuntimeInfoError,
};
use crate::runtime::types::SocketInfo;
use crate::types::{ContainerId, NetworkId};
use async_trait::async_trait;
use bollard::Docker;
use bollard::container::LogOutput;
use bollard::errors::Error as BollardError;
use bollard::exec::{StartExecOptions, StartExecResults};
use bollard::query_parameters::{ListContainersOptions, ListNetworksOptions, LogsOptions};
use futures::StreamExt;
use std::collections::HashMap;

/// Seconds before an Engine API request is abandoned.
const REQUEST_TIMEOUT: u64 = 120;

/// Status code and message of an error response from the daemon.
fn response_status(e: &BollardError) -> Option<(u16, String)> {
    match e {
        BollardError::DockerResponseServerError {
            status_code,
            message,
        } => Some((*status_code, message.clone())),
        _ => None,
    }
}

fn network_error(e: BollardError) -> NetworkError {
    match response_status(&e) {
        Some((404, message)) => NetworkError::NotFound(message),
        Some((403 | 409, message)) => NetworkError::InUse(message),
        _ => NetworkError::Runtime(e.to_string()),
    }
}

fn exec_error(e: BollardError) -> ExecError {
    match response_status(&e) {
        Some((404, message)) => ExecError::ContainerNotFound(message),
        Some((409, message)) => ExecError::ContainerNotRunning(message),
        _ => ExecError::Runtime(e.to_string()),
    }
}

fn log_error(e: BollardError) -> LogError {
    match response_status(&e) {
        Some((404, message)) => LogError::ContainerNotFound(message),
        _ => LogError::StreamError(e.to_string()),
    }
}

fn log_line(output: LogOutput) -> LogLine {
    let (stream, message) = match output {
        LogOutput::StdErr { message } => (LogStream::Stderr, message),
        LogOutput::StdOut { message }
        | LogOutput::StdIn { message }
        | LogOutput::Console { message } => (LogStream::Stdout, message),
    };
    LogLine {
        content: String::from_utf8_lossy(&message).into_owned(),
        stream,
    }
}

fn container_summary(c: bollard::models::ContainerSummary) -> ContainerSummary {
    let name = c
        .names
        .as_deref()
        .and_then(<[String]>::first)
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_default();
    ContainerSummary {
        id: ContainerId::new(c.id.unwrap_or_default()),
        name,
        image: c.image.unwrap_or_default(),
        state: c
            .state
            .map(|s| format!("{s:?}").to_lowercase())
            .unwrap_or_default(),
        status: c.status.unwrap_or_default(),
        labels: c.labels.unwrap_or_default(),
    }
}

pub struct BollardRuntime {
    client: Docker,
    socket_path: String,
}

impl std::fmt::Debug for BollardRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BollardRuntime")
            .field("socket_path", &self.socket_path)
            .finish()
    }
}

impl BollardRuntime {
    /// Connecting is lazy, so this only fails on an unusable socket path.
    pub fn connect(info: &SocketInfo) -> Result<Self, RuntimeInfoError> {
        let client = Docker::connect_with_unix(
            &info.socket_path,
            REQUEST_TIMEOUT,
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;
        Ok(Self {
            client,
            socket_path: info.socket_path.clone(),
        })
    }
}

impl Sealed for BollardRuntime {}

#[async_trait]
impl RuntimeInfo for BollardRuntime {
    async fn ping(&self) -> Result<(), RuntimeInfoError> {
        match self.client.ping().await {
            Ok(_) => Ok(()),
            Err(e) if response_status(&e).is_some() => Err(RuntimeInfoError::Runtime(e.to_string())),
            Err(e) => Err(RuntimeInfoError::ConnectionFailed(e.to_string())),
        }
    }
}

#[async_trait]
impl ContainerOps for BollardRuntime {
    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError> {
        let mut query: HashMap<String, Vec<String>> = HashMap::new();
        if let Some(name) = &filters.name {
            query.insert("name".to_string(), vec![name.clone()]);
        }
        if !filters.labels.is_empty() {
            let labels = filters
                .labels
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            query.insert("label".to_string(), labels);
        }

        let containers = self
            .client
            .list_containers(Some(ListContainersOptions {
                all: filters.all,
                filters: Some(query),
                ..Default::default()
            }))
            .await
            .map_err(|e| ContainerError::Runtime(e.to_string()))?;

        Ok(containers.into_iter().map(container_summary).collect())
    }
}

#[async_trait]
impl NetworkOps for BollardRuntime {
    async fn list_networks(&self, name: &str) -> Result<Vec<NetworkSummary>, NetworkError> {
        let query = HashMap::from([("name".to_string(), vec![name.to_string()])]);
        let networks = self
            .client
            .list_networks(Some(ListNetworksOptions {
                filters: Some(query),
                ..Default::default()
            }))
            .await
            .map_err(|e| NetworkError::Runtime(e.to_string()))?;

        Ok(networks
            .into_iter()
            .map(|n| NetworkSummary {
                id: NetworkId::new(n.id.unwrap_or_default()),
                name: n.name.unwrap_or_default(),
            })
            .collect())
    }

    async fn remove_network(&self, id: &NetworkId) -> Result<(), NetworkError> {
        self.client
            .remove_network(id.as_str())
            .await
            .map_err(network_error)
    }
}

#[async_trait]
impl ExecOps for BollardRuntime {
    async fn exec(
        &self,
        container: &ContainerId,
        config: &ExecConfig,
    ) -> Result<ExecResult, ExecError> {
        let created = self
            .client
            .create_exec(
                container.as_str(),
                bollard::models::ExecConfig {
                    cmd: Some(config.cmd.clone()),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    ..Default::default()
                },
            )
            .await
            .map_err(exec_error)?;

        let started = self
            .client
            .start_exec(&created.id, Some(StartExecOptions::default()))
            .await
            .map_err(exec_error)?;

        let mut result = ExecResult {
            exit_code: 0,
            stdout: Vec::new(),
            stderr: Vec::new(),
        };
        if let StartExecResults::Attached { mut output, .. } = started {
            while let Some(chunk) = output.next().await {
                match chunk.map_err(|e| ExecError::Interrupted(e.to_string()))? {
                    LogOutput::StdOut { message } => result.stdout.extend(message),
                    LogOutput::StdErr { message } => result.stderr.extend(message),
                    _ => {}
                }
            }
        }

        let inspected = self
            .client
            .inspect_exec(&created.id)
            .await
            .map_err(exec_error)?;
        result.exit_code = inspected.exit_code.unwrap_or(0);
        Ok(result)
    }
}

#[async_trait]
impl LogOps for BollardRuntime {
    async fn container_logs(
        &self,
        id: &ContainerId,
        opts: &LogOptions,
    ) -> Result<LogStreamBox, LogError> {
        let query = LogsOptions {
            stdout: true,
            stderr: true,
            follow: opts.follow,
            tail: opts.tail.map_or_else(|| "all".to_string(), |n| n.to_string()),
            ..Default::default()
        };
        let lines = self
            .client
            .logs(id.as_str(), Some(query))
            .map(|chunk| chunk.map(log_line).map_err(log_error));
        Ok(Box::pin(lines))
    }
}
