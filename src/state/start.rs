// ABOUTME: Brings the compose stack up and waits for the node and mirror ports.
// ABOUTME: A failed compose-up raises DockerError, then is retried once.

use super::init::read_env_file;
use super::work_dir::WorkDir;
use super::{State, StateError, Subscription};
use crate::controller::Observer;
use crate::services::{
    CLI_SERVICE, CONNECTION_SERVICE, CliOptions, CliService, ConnectionOps, DOCKER_SERVICE,
    DockerOps, LocatorError, ServiceLocator,
};
use crate::types::EventType;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, trace};

/// Mirror node gRPC, then the consensus node.
const STARTUP_PORTS: [u16; 2] = [5600, 50211];

pub struct StartState {
    cli: Arc<CliService>,
    docker: Arc<dyn DockerOps>,
    connection: Arc<dyn ConnectionOps>,
    subscription: Subscription,
}

impl StartState {
    pub fn new(locator: &ServiceLocator) -> Result<Self, LocatorError> {
        let state = Self {
            cli: locator.get(CLI_SERVICE)?,
            docker: locator.get(DOCKER_SERVICE)?,
            connection: locator.get(CONNECTION_SERVICE)?,
            subscription: Subscription::default(),
        };
        trace!("Start State Initialized!");
        Ok(state)
    }

    /// `true` when compose exited cleanly.
    async fn compose_up(&self, files: &[PathBuf], env: &[(String, String)]) -> bool {
        match self.docker.compose_up(files, env).await {
            Ok(output) if output.success() => true,
            Ok(output) => {
                error!(
                    "docker compose up exited with {}: {}",
                    output.exit_code,
                    output.stderr.trim()
                );
                false
            }
            Err(e) => {
                error!("docker compose up failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl State for StartState {
    fn name(&self) -> &'static str {
        "StartState"
    }

    fn subscribe(&mut self, observer: Observer) {
        self.subscription.set(observer);
    }

    async fn on_start(&mut self) -> Result<(), StateError> {
        let observer = self.subscription.observer(self.name())?.clone();
        let options = self.cli.options();
        info!("Starting Hedera Local Node...");

        let env_file = WorkDir::new(&options.work_dir).env_file();
        let env = if env_file.exists() {
            read_env_file(&env_file)?
        } else {
            Vec::new()
        };
        let files = compose_files(options)?;

        if !self.compose_up(&files, &env).await {
            observer.update(EventType::DockerError).await;
            if !self.compose_up(&files, &env).await {
                observer.update(EventType::UnknownError).await;
                return Ok(());
            }
        }

        info!("Detecting network...");
        if let Err(e) = self.connection.wait_for_firing_up(&STARTUP_PORTS).await {
            error!("{}", e);
            observer.update(EventType::UnknownError).await;
            return Ok(());
        }

        info!("Hedera Local Node successfully started!");
        observer.update(EventType::Finish).await;
        Ok(())
    }
}

/// Compose files for `options`, relative to the compose root, in the order
/// they are layered.
pub(crate) fn compose_files(options: &CliOptions) -> Result<Vec<PathBuf>, StateError> {
    let mut files = vec![PathBuf::from("docker-compose.yml")];
    if !options.full_mode {
        files.push("docker-compose.evm.yml".into());
    }
    if options.multi_node {
        files.push("docker-compose.multinode.yml".into());
    }
    if options.user_compose {
        let dir = if options.user_compose_dir.is_absolute() {
            options.user_compose_dir.clone()
        } else {
            options.compose_root.join(&options.user_compose_dir)
        };
        files.extend(user_compose_files(&dir)?);
    }
    Ok(files)
}

/// Sorted `*.yml` files in `dir`; a missing directory yields none.
fn user_compose_files(dir: &Path) -> Result<Vec<PathBuf>, StateError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_yml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yml"));
        if is_yml && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
