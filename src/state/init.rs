// ABOUTME: Checks the host and writes the configuration the network starts from.
// ABOUTME: Produces the compose environment file, bootstrap.properties and mirror settings.

use super::mirror_config::{
    DATA_PATH, DOWNLOADER_LOCAL, DOWNLOADER_SOURCES, MONITOR_NODES, MirrorApplication,
};
use super::work_dir::{MIRROR_APPLICATION_YML, NODE_CONFIG_DIR, WorkDir};
use super::{State, StateError, Subscription};
use crate::config::{NetworkConfiguration, OriginalNodeConfiguration, render_properties};
use crate::controller::Observer;
use crate::services::{
    CLI_SERVICE, CliService, DOCKER_SERVICE, DockerOps, LocatorError, ServiceLocator,
};
use crate::types::EventType;
use crate::utils::fs::{copy_path, ensure_dir};
use async_trait::async_trait;
use serde_yaml::Value;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, trace};

/// Ports the network cannot start without.
pub const NECESSARY_PORTS: [u16; 7] = [5551, 8545, 5600, 5433, 50211, 8082, 6379];
/// Ports of optional services; a conflict only disables that service.
pub const OPTIONAL_PORTS: [u16; 3] = [7546, 8080, 3000];

pub struct InitState {
    cli: Arc<CliService>,
    docker: Arc<dyn DockerOps>,
    subscription: Subscription,
}

impl InitState {
    pub fn new(locator: &ServiceLocator) -> Result<Self, LocatorError> {
        let state = Self {
            cli: locator.get(CLI_SERVICE)?,
            docker: locator.get(DOCKER_SERVICE)?,
            subscription: Subscription::default(),
        };
        trace!("Initialization State Initialized!");
        Ok(state)
    }

    async fn host_is_ready(&self) -> bool {
        info!("Making sure that Docker is started and it's correct version...");
        let compose_ok = self.docker.is_correct_compose_version().await;
        let docker_ok = self.docker.check_docker().await;
        if !docker_ok {
            error!("Docker is not running.");
        }
        if !(compose_ok && docker_ok) {
            return false;
        }

        let ports: Vec<u16> = NECESSARY_PORTS.iter().chain(&OPTIONAL_PORTS).copied().collect();
        let in_use = self.docker.ports_in_use(&ports).await;
        for port in &in_use {
            if OPTIONAL_PORTS.contains(port) {
                info!("Port {} is in use.", port);
            } else {
                error!("Port {} is in use.", port);
            }
        }
        if in_use.iter().any(|port| NECESSARY_PORTS.contains(port)) {
            error!("Node cannot start properly because necessary ports are in use");
            return false;
        }
        true
    }

    fn configure(&self, work_dir: &WorkDir) -> Result<(), StateError> {
        let options = self.cli.options();
        let network = NetworkConfiguration::for_network(options.network)?;
        let original = OriginalNodeConfiguration::load()?;

        info!(
            "Setting configuration for {} network with latest images on host {} with dev mode turned {} using {} mode in {} node configuration...",
            options.network,
            options.host,
            if options.dev_mode { "on" } else { "off" },
            if options.full_mode { "full" } else { "turbo" },
            if options.multi_node { "multi" } else { "single" },
        );

        prepare_work_dir(work_dir, &options.compose_root)?;
        fs::write(work_dir.env_file(), self.environment(&network, work_dir))?;
        info!("Needed environment variables were set for this configuration.");

        let properties = original
            .bootstrap_properties
            .iter()
            .chain(&network.node_properties);
        for property in &network.node_properties {
            trace!("Bootstrap property {} will be set to {}.", property.key, property.value);
        }
        fs::write(work_dir.bootstrap_properties(), render_properties(properties))?;
        info!("Needed bootstrap properties were set for this configuration.");

        self.configure_mirror_node(work_dir, &original)?;
        Ok(())
    }

    fn environment(&self, network: &NetworkConfiguration, work_dir: &WorkDir) -> String {
        let options = self.cli.options();
        let mut vars: Vec<(String, String)> = network
            .environment()
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect();
        vars.push((
            "NETWORK_NODE_LOGS_ROOT_PATH".into(),
            work_dir.node_logs().display().to_string(),
        ));
        vars.push((
            "APPLICATION_CONFIG_PATH".into(),
            work_dir.node_config().display().to_string(),
        ));
        vars.push((
            "MIRROR_NODE_APPLICATION_PATH".into(),
            work_dir.mirror_application().display().to_string(),
        ));
        if !options.limits {
            vars.push(("RELAY_HBAR_RATE_LIMIT_TINYBAR".into(), "0".into()));
            vars.push(("RELAY_HBAR_RATE_LIMIT_DURATION".into(), "0".into()));
            vars.push(("RELAY_RATE_LIMIT_DISABLED".into(), "true".into()));
            info!("Hedera JSON-RPC Relay rate limits were disabled.");
        }
        if options.dev_mode {
            vars.push(("RELAY_DEV_MODE".into(), "true".into()));
        }

        let mut text = String::new();
        for (key, value) in &vars {
            trace!("Environment variable {} will be set to {}.", key, value);
            let _ = writeln!(text, "{key}={value}");
        }
        text
    }

    fn configure_mirror_node(
        &self,
        work_dir: &WorkDir,
        original: &OriginalNodeConfiguration,
    ) -> io::Result<()> {
        trace!("Configuring required mirror node properties, depending on selected configuration...");
        let options = self.cli.options();
        let path = work_dir.mirror_application();
        let Some(mut application) = MirrorApplication::load(&path)? else {
            trace!("Mirror Node Properties File doesn't exist at path {}", path.display());
            return Ok(());
        };

        if !options.full_mode {
            let turbo = &original.turbo_node_properties;
            application.set(DATA_PATH, Value::from(turbo.data_path.clone()));
            application.set(DOWNLOADER_SOURCES, turbo.sources.clone());
        }
        if options.enable_debug {
            application.set(DOWNLOADER_LOCAL, original.local.clone());
        }
        if options.multi_node {
            application.set(MONITOR_NODES, original.multi_node_properties.clone());
        }

        application.save(&path)?;
        info!("Needed mirror node properties were set for this configuration.");
        Ok(())
    }
}

#[async_trait]
impl State for InitState {
    fn name(&self) -> &'static str {
        "InitState"
    }

    fn subscribe(&mut self, observer: Observer) {
        self.subscription.set(observer);
    }

    async fn on_start(&mut self) -> Result<(), StateError> {
        let observer = self.subscription.observer(self.name())?.clone();
        trace!("Initialization State Starting...");

        if !self.host_is_ready().await {
            observer.update(EventType::UnresolvableError).await;
            return Ok(());
        }

        let work_dir = WorkDir::new(&self.cli.options().work_dir);
        self.configure(&work_dir)?;
        observer.update(EventType::Finish).await;
        Ok(())
    }
}

/// Create the log tree and copy the node and mirror configuration from the
/// compose root.
fn prepare_work_dir(work_dir: &WorkDir, compose_root: &Path) -> io::Result<()> {
    info!("Local Node Working directory set to {}", work_dir.root().display());
    ensure_dir(work_dir.root())?;
    ensure_dir(&work_dir.node_logs())?;
    copy_path(&compose_root.join(NODE_CONFIG_DIR), &work_dir.node_config())?;
    copy_path(
        &compose_root.join(MIRROR_APPLICATION_YML),
        &work_dir.mirror_application(),
    )?;
    ensure_dir(&work_dir.node_config())
}

/// Parse a `KEY=VALUE` environment file. Blank lines and `#` comments are
/// skipped.
pub fn read_env_file(path: &Path) -> io::Result<Vec<(String, String)>> {
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_file_round_trips_values_with_equals_signs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local-node.env");
        fs::write(&path, "# comment\nA=1\n\nB=x=y\n").unwrap();

        let vars = read_env_file(&path).unwrap();
        assert_eq!(
            vars,
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "x=y".to_string())
            ]
        );
    }

    #[test]
    fn necessary_and_optional_ports_do_not_overlap() {
        assert!(OPTIONAL_PORTS.iter().all(|p| !NECESSARY_PORTS.contains(p)));
    }
}
