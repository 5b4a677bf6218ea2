// ABOUTME: Stops the compose stack and removes what a run leaves behind.
// ABOUTME: Shared by the stop workflow and Docker recovery.

use super::work_dir::WorkDir;
use super::{State, StateError, Subscription};
use crate::controller::Observer;
use crate::services::{
    CLI_SERVICE, DOCKER_SERVICE, DockerError, DockerOps, LocatorError, ServiceLocator,
};
use crate::types::EventType;
use crate::utils::fs::remove_dir;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, trace};

pub struct StopState {
    docker: Arc<dyn DockerOps>,
    work_dir: WorkDir,
    subscription: Subscription,
}

impl StopState {
    pub fn new(locator: &ServiceLocator) -> Result<Self, LocatorError> {
        let cli = locator.get(CLI_SERVICE)?;
        let state = Self {
            docker: locator.get(DOCKER_SERVICE)?,
            work_dir: WorkDir::new(&cli.options().work_dir),
            subscription: Subscription::default(),
        };
        trace!("Stop State Initialized!");
        Ok(state)
    }
}

#[async_trait]
impl State for StopState {
    fn name(&self) -> &'static str {
        "StopState"
    }

    fn subscribe(&mut self, observer: Observer) {
        self.subscription.set(observer);
    }

    async fn on_start(&mut self) -> Result<(), StateError> {
        let observer = self.subscription.observer(self.name())?.clone();
        info!("Initiating stop procedure. Trying to stop docker containers and clean up volumes...");
        stop_network(self.docker.as_ref(), &self.work_dir).await?;
        info!("Hedera Local Node was stopped successfully.");
        observer.update(EventType::Finish).await;
        Ok(())
    }
}

/// Kill and remove the project containers and volumes, delete the log tree
/// and remove leftover networks. Docker failures are logged, not returned.
pub(crate) async fn stop_network(docker: &dyn DockerOps, work_dir: &WorkDir) -> Result<(), StateError> {
    trace!("Stopping the docker containers...");
    if let Err(e) = docker.compose_stop().await {
        debug!("Stopping containers failed: {}", e);
    }

    trace!("Cleaning the volumes and temp files...");
    remove_dir(&work_dir.network_logs())?;

    match docker.remove_networks().await {
        Ok(removed) => trace!("Removed {} network(s)", removed.len()),
        Err(DockerError::Unavailable(e)) => debug!("Skipping network removal: {}", e),
        Err(e) => debug!("Removing networks failed: {}", e),
    }
    Ok(())
}
