// ABOUTME: Builds the service locator once at process start.
// ABOUTME: Registers the CLI, settings, Docker, connection and ledger client services.

use super::client::{ClientService, LedgerClient};
use super::connection::{ConnectionOps, ConnectionService};
use super::docker::{DockerOps, DockerService};
use super::{
    CLI_SERVICE, CLIENT_SERVICE, CONNECTION_SERVICE, CliService, DOCKER_SERVICE, LocatorError,
    SETTINGS, ServiceLocator,
};
use crate::cli::Cli;
use crate::config::{NetworkConfiguration, Settings};
use crate::error::Result;
use std::sync::Arc;

pub struct Bootstrapper;

impl Bootstrapper {
    /// Resolve the command line and construct the production services.
    pub fn initialize(cli: &Cli, settings: Settings) -> Result<Arc<ServiceLocator>> {
        let cli_service = CliService::new(cli);
        let options = cli_service.options();
        tracing::debug!("Resolved options: {:?}", options);

        let docker: Arc<dyn DockerOps> =
            Arc::new(DockerService::new(&options.compose_root, settings.retry));
        let connection: Arc<dyn ConnectionOps> = Arc::new(ConnectionService::new(
            options.host.clone(),
            settings.connection,
            settings.log_debounce,
        ));
        let network = NetworkConfiguration::for_network(options.network)?;
        let client: Arc<dyn LedgerClient> =
            Arc::new(ClientService::new(options.host.clone(), &network));

        let locator = Self::assemble(cli_service, settings, docker, connection, client)?;
        Ok(Arc::new(locator))
    }

    /// Register an already-built set of services.
    pub fn assemble(
        cli: CliService,
        settings: Settings,
        docker: Arc<dyn DockerOps>,
        connection: Arc<dyn ConnectionOps>,
        client: Arc<dyn LedgerClient>,
    ) -> std::result::Result<ServiceLocator, LocatorError> {
        let mut locator = ServiceLocator::new();
        locator.register(CLI_SERVICE, Arc::new(cli))?;
        locator.register(SETTINGS, Arc::new(settings))?;
        locator.register(DOCKER_SERVICE, docker)?;
        locator.register(CONNECTION_SERVICE, connection)?;
        locator.register(CLIENT_SERVICE, client)?;
        Ok(locator)
    }
}
