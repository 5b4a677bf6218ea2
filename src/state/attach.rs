// ABOUTME: Follows the main containers' logs until the user interrupts.
// ABOUTME: Detached runs finish immediately; attached runs log a status board every 10 seconds.

use super::{State, StateError, Subscription};
use crate::controller::Observer;
use crate::runtime::{LogLine, LogOptions};
use crate::services::{
    CLI_SERVICE, CliService, DOCKER_SERVICE, DockerOps, LocatorError, ServiceLocator,
};
use crate::types::EventType;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, trace, warn};

const CONSENSUS_NODE: &str = "network-node";
const MIRROR_NODE_REST: &str = "mirror-node-rest";
const RELAY: &str = "json-rpc-relay";

/// Containers shown on the status board: display name and container name.
const STATUS_CONTAINERS: [(&str, &str); 3] = [
    ("Consensus Node", CONSENSUS_NODE),
    ("Mirror Node", "mirror-node-grpc"),
    ("Relay", RELAY),
];

const STATUS_INTERVAL: Duration = Duration::from_secs(10);

/// Operator heartbeat transactions; too frequent to be useful when attached.
const HEARTBEAT_FILTER: &str = " Transaction ID: 0.0.2-";

pub struct AttachState {
    cli: Arc<CliService>,
    docker: Arc<dyn DockerOps>,
    subscription: Subscription,
}

impl AttachState {
    pub fn new(locator: &ServiceLocator) -> Result<Self, LocatorError> {
        let state = Self {
            cli: locator.get(CLI_SERVICE)?,
            docker: locator.get(DOCKER_SERVICE)?,
            subscription: Subscription::default(),
        };
        trace!("Attach State Initialized!");
        Ok(state)
    }

    async fn attach_logs(&self) -> BoxStream<'static, (&'static str, LogLine)> {
        let mut streams = Vec::new();
        for container in [CONSENSUS_NODE, MIRROR_NODE_REST, RELAY] {
            match self
                .docker
                .container_logs(container, &LogOptions::follow_new())
                .await
            {
                Ok(logs) => streams.push(
                    logs.filter_map(move |line| async move { line.ok().map(|l| (container, l)) })
                        .boxed(),
                ),
                Err(e) => warn!("Cannot attach to {}: {}", container, e),
            }
        }
        stream::select_all(streams).boxed()
    }

    async fn log_status_board(&self) {
        info!("Local Node status:");
        for (label, container) in STATUS_CONTAINERS {
            match self.docker.container(container).await {
                Ok(summary) => info!(
                    "| {:<15} | {:<10} | {:<12} |",
                    label,
                    summary.state,
                    summary.image_tag()
                ),
                Err(_) => info!("| {:<15} | {:<10} | {:<12} |", label, "stopped", "-"),
            }
        }
    }
}

#[async_trait]
impl State for AttachState {
    fn name(&self) -> &'static str {
        "AttachState"
    }

    fn subscribe(&mut self, observer: Observer) {
        self.subscription.set(observer);
    }

    async fn on_start(&mut self) -> Result<(), StateError> {
        let observer = self.subscription.observer(self.name())?.clone();
        if self.cli.options().detached {
            observer.update(EventType::Finish).await;
            return Ok(());
        }

        let mut logs = self.attach_logs().await;
        let mut status = tokio::time::interval(STATUS_INTERVAL);
        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(interrupt);

        loop {
            tokio::select! {
                _ = &mut interrupt => {
                    info!("Detaching from the network");
                    break;
                }
                _ = status.tick() => self.log_status_board().await,
                Some((container, line)) = logs.next() => {
                    let text = line.content.trim_end();
                    if !text.contains(HEARTBEAT_FILTER) {
                        info!("[{}] {}", container, text);
                    }
                }
            }
        }

        observer.update(EventType::Finish).await;
        Ok(())
    }
}
