// ABOUTME: Shared collaborators resolved through the service locator.
// ABOUTME: Typed keys for every service registered at bootstrap.

mod bootstrap;
pub mod cli;
pub mod client;
pub mod connection;
pub mod docker;
mod locator;

pub use bootstrap::Bootstrapper;
pub use cli::{APP_NAME, CliOptions, CliService};
pub use client::{AccountRequest, ClientError, ClientService, CreatedAccount, LedgerClient};
pub use connection::{ConnectionError, ConnectionOps, ConnectionService};
pub use docker::{DockerError, DockerOps, DockerService};
pub use locator::{LocatorError, ServiceKey, ServiceLocator};

use crate::config::Settings;

pub const CLI_SERVICE: ServiceKey<CliService> = ServiceKey::new("CLIService");
pub const SETTINGS: ServiceKey<Settings> = ServiceKey::new("Settings");
pub const DOCKER_SERVICE: ServiceKey<dyn DockerOps> = ServiceKey::new("DockerService");
pub const CONNECTION_SERVICE: ServiceKey<dyn ConnectionOps> =
    ServiceKey::new("ConnectionService");
pub const CLIENT_SERVICE: ServiceKey<dyn LedgerClient> = ServiceKey::new("ClientService");
