// ABOUTME: Best-effort Docker remediation after a phase reports DockerError.
// ABOUTME: Always reports UnknownError once remediation has been attempted.

use super::stop::stop_network;
use super::work_dir::WorkDir;
use super::{State, StateError, Subscription};
use crate::controller::Observer;
use crate::services::{CLI_SERVICE, DOCKER_SERVICE, DockerOps, LocatorError, ServiceLocator};
use crate::types::EventType;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, trace};

pub struct RecoveryState {
    event: EventType,
    docker: Arc<dyn DockerOps>,
    work_dir: WorkDir,
    subscription: Subscription,
}

impl RecoveryState {
    /// `event` is the event that triggered recovery.
    pub fn new(locator: &ServiceLocator, event: EventType) -> Result<Self, LocatorError> {
        let cli = locator.get(CLI_SERVICE)?;
        let state = Self {
            event,
            docker: locator.get(DOCKER_SERVICE)?,
            work_dir: WorkDir::new(&cli.options().work_dir),
            subscription: Subscription::default(),
        };
        trace!("Recovery State Initialized!");
        Ok(state)
    }
}

#[async_trait]
impl State for RecoveryState {
    fn name(&self) -> &'static str {
        "RecoveryState"
    }

    fn subscribe(&mut self, observer: Observer) {
        self.subscription.set(observer);
    }

    async fn on_start(&mut self) -> Result<(), StateError> {
        let observer = self.subscription.observer(self.name())?.clone();
        info!("Starting Recovery State...");
        if self.event == EventType::DockerError {
            stop_network(self.docker.as_ref(), &self.work_dir).await?;
            info!("Trying to startup again...");
        }
        observer.update(EventType::UnknownError).await;
        Ok(())
    }
}
