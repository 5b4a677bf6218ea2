// ABOUTME: Reverts the node and mirror configuration files to their original content.
// ABOUTME: Runs as a workflow step and as the terminal step of a failed workflow.

use super::mirror_config::{
    DATA_PATH, DOWNLOADER_LOCAL, DOWNLOADER_SOURCES, MONITOR_NODES, MirrorApplication,
};
use super::work_dir::WorkDir;
use super::{State, StateError, Subscription};
use crate::config::OriginalNodeConfiguration;
use crate::controller::Observer;
use crate::services::{CLI_SERVICE, LocatorError, ServiceLocator};
use crate::types::EventType;
use async_trait::async_trait;
use std::fs;
use tracing::{info, trace};

pub struct CleanUpState {
    work_dir: WorkDir,
    subscription: Subscription,
}

impl CleanUpState {
    pub fn new(locator: &ServiceLocator) -> Result<Self, LocatorError> {
        let cli = locator.get(CLI_SERVICE)?;
        trace!("Clean Up State Initialized!");
        Ok(Self::for_work_dir(WorkDir::new(&cli.options().work_dir)))
    }

    pub fn for_work_dir(work_dir: WorkDir) -> Self {
        Self {
            work_dir,
            subscription: Subscription::default(),
        }
    }

    /// Rewrite both files from the original configuration. Running this
    /// twice leaves the same content as running it once.
    pub fn revert(&self) -> Result<(), StateError> {
        let original = OriginalNodeConfiguration::load()?;
        self.revert_node_properties(&original)?;
        self.revert_mirror_node_properties(&original)?;
        Ok(())
    }

    fn revert_node_properties(&self, original: &OriginalNodeConfiguration) -> Result<(), StateError> {
        trace!("Clean up unneeded bootstrap properties.");
        let path = self.work_dir.bootstrap_properties();
        if !path.exists() {
            trace!("Node Properties File doesn't exist at path {}", path.display());
            return Ok(());
        }
        fs::write(&path, original.bootstrap_text())?;
        info!("Clean up of consensus node properties finished.");
        Ok(())
    }

    fn revert_mirror_node_properties(
        &self,
        original: &OriginalNodeConfiguration,
    ) -> Result<(), StateError> {
        trace!("Clean up unneeded mirror node properties...");
        let path = self.work_dir.mirror_application();
        let Some(mut application) = MirrorApplication::load(&path)? else {
            trace!("Mirror Node Properties File doesn't exist at path {}", path.display());
            return Ok(());
        };
        application.remove(DATA_PATH);
        application.remove(DOWNLOADER_SOURCES);
        application.remove(DOWNLOADER_LOCAL);
        application.set(MONITOR_NODES, original.full_node_properties.clone());
        application.save(&path)?;
        info!("Clean up of mirror node properties finished.");
        Ok(())
    }
}

#[async_trait]
impl State for CleanUpState {
    fn name(&self) -> &'static str {
        "CleanUpState"
    }

    fn subscribe(&mut self, observer: Observer) {
        self.subscription.set(observer);
    }

    async fn on_start(&mut self) -> Result<(), StateError> {
        let observer = self.subscription.observer(self.name())?.clone();
        info!("Initiating clean up procedure. Trying to revert unneeded changes to files...");
        self.revert()?;
        observer.update(EventType::Finish).await;
        Ok(())
    }
}
