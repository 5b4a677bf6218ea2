// ABOUTME: Resolves parsed command-line arguments into immutable CliOptions.
// ABOUTME: Non-startup commands are always detached.

use crate::cli::{AccountArgs, Cli, Commands, StartArgs};
use crate::types::{NetworkType, VerboseLevel, Workflow};
use crate::utils::fs::app_data_path;
use std::path::PathBuf;

pub const APP_NAME: &str = "hedera-local";

/// Resolved configuration for one invocation. Created once, never mutated.
#[derive(Debug, Clone)]
pub struct CliOptions {
    pub accounts: u32,
    pub asynchronous: bool,
    pub balance: u64,
    pub detached: bool,
    pub host: String,
    pub network: NetworkType,
    pub limits: bool,
    pub dev_mode: bool,
    pub full_mode: bool,
    pub multi_node: bool,
    pub user_compose: bool,
    pub user_compose_dir: PathBuf,
    pub blocklisting: bool,
    /// True for workflows that bring the network up.
    pub startup: bool,
    pub verbose: VerboseLevel,
    pub timestamp: Option<String>,
    pub enable_debug: bool,
    pub create_initial_resources: bool,
    pub work_dir: PathBuf,
    pub compose_root: PathBuf,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self::resolve(Workflow::Stop, &AccountArgs::default(), None, None)
    }
}

impl CliOptions {
    fn resolve(
        workflow: Workflow,
        accounts: &AccountArgs,
        start: Option<&StartArgs>,
        timestamp: Option<String>,
    ) -> Self {
        let startup = workflow.is_startup();
        Self {
            accounts: accounts.accounts,
            asynchronous: accounts.asynchronous,
            balance: accounts.balance,
            detached: !startup || start.is_some_and(|s| s.detached),
            host: accounts.host.clone(),
            network: start.map(|s| s.network).unwrap_or_default(),
            limits: start.is_some_and(|s| s.limits),
            dev_mode: start.is_some_and(|s| s.dev),
            full_mode: start.is_some_and(|s| s.full),
            multi_node: start.is_some_and(|s| s.multinode),
            user_compose: start.is_none_or(|s| s.usercompose),
            user_compose_dir: start
                .map(|s| s.composedir.clone())
                .unwrap_or_else(|| PathBuf::from("./overrides/")),
            blocklisting: start.is_some_and(|s| s.blocklist),
            startup,
            verbose: VerboseLevel::Info,
            timestamp,
            enable_debug: start.is_some_and(|s| s.enable_debug),
            create_initial_resources: start.is_some_and(|s| s.create_initial_resources),
            work_dir: app_data_path(APP_NAME),
            compose_root: PathBuf::from("."),
        }
    }
}

/// Holds the resolved options and the workflow they were resolved for.
#[derive(Debug, Clone)]
pub struct CliService {
    workflow: Workflow,
    options: CliOptions,
}

impl CliService {
    pub fn new(cli: &Cli) -> Self {
        let defaults = AccountArgs::default();
        let (workflow, accounts, start, timestamp) = match &cli.command {
            Commands::Start(args) => (Workflow::Start, &args.accounts, Some(args), None),
            Commands::Restart(args) => (Workflow::Restart, &args.accounts, Some(args), None),
            Commands::Stop => (Workflow::Stop, &defaults, None, None),
            Commands::GenerateAccounts(args) => (Workflow::AccountCreation, args, None, None),
            Commands::Debug { timestamp } => (Workflow::Debug, &defaults, None, timestamp.clone()),
        };

        let mut options = CliOptions::resolve(workflow, accounts, start, timestamp);
        options.verbose = cli.verbose;
        options.compose_root = cli.compose_root.clone();
        if let Some(work_dir) = &cli.workdir {
            options.work_dir = work_dir.clone();
        }

        Self { workflow, options }
    }

    pub fn from_options(workflow: Workflow, options: CliOptions) -> Self {
        Self { workflow, options }
    }

    pub fn workflow(&self) -> Workflow {
        self.workflow
    }

    pub fn options(&self) -> &CliOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn service(args: &[&str]) -> CliService {
        let argv = std::iter::once("hedera-local").chain(args.iter().copied());
        CliService::new(&Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn start_is_a_startup_workflow() {
        let service = service(&["start", "3", "--balance", "50"]);
        assert_eq!(service.workflow(), Workflow::Start);
        let options = service.options();
        assert!(options.startup);
        assert!(!options.detached);
        assert_eq!(options.accounts, 3);
        assert_eq!(options.balance, 50);
    }

    #[test]
    fn non_startup_commands_are_forced_detached() {
        for args in [&["stop"][..], &["generate-accounts", "2"], &["debug", "1707081291.338308003"]] {
            let options = service(args).options().clone();
            assert!(options.detached, "{args:?}");
            assert!(!options.startup, "{args:?}");
        }
    }

    #[test]
    fn generate_accounts_maps_to_account_creation() {
        let service = service(&["generate-accounts", "4", "-a"]);
        assert_eq!(service.workflow(), Workflow::AccountCreation);
        assert_eq!(service.options().accounts, 4);
        assert!(service.options().asynchronous);
    }

    #[test]
    fn global_paths_override_defaults() {
        let service = service(&["--workdir", "/tmp/hl", "--compose-root", "/opt/hl", "stop"]);
        assert_eq!(service.options().work_dir, PathBuf::from("/tmp/hl"));
        assert_eq!(service.options().compose_root, PathBuf::from("/opt/hl"));
    }

    #[test]
    fn debug_keeps_timestamp() {
        let service = service(&["debug", "1707081291-338308003"]);
        assert_eq!(
            service.options().timestamp.as_deref(),
            Some("1707081291-338308003")
        );
    }
}
