// ABOUTME: Entry point for the hedera-local CLI application.
// ABOUTME: Parses arguments, builds the services and runs the selected workflow.

use clap::Parser;
use hedera_local::cli::Cli;
use hedera_local::config::Settings;
use hedera_local::controller::{StateController, WorkflowOutcome};
use hedera_local::data::StateData;
use hedera_local::error::Result;
use hedera_local::services::{Bootstrapper, CLI_SERVICE};
use hedera_local::utils::WorkDirLock;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.verbose.directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let code = match run(cli).await {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<WorkflowOutcome> {
    let cwd = env::current_dir()?;
    let settings = Settings::discover(cli.config.as_deref(), &cwd)?;
    let locator = Bootstrapper::initialize(&cli, settings)?;

    let cli_service = locator.get(CLI_SERVICE)?;
    let workflow = cli_service.workflow();
    let _lock = if workflow.is_startup() {
        Some(WorkDirLock::acquire(
            &cli_service.options().work_dir,
            workflow.name(),
        )?)
    } else {
        None
    };

    let mut controller: StateController =
        StateController::new(workflow.name(), StateData::new(locator));
    Ok(controller.start_state_machine().await)
}
