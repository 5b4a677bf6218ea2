// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Subcommands map one-to-one onto workflows.

use crate::types::{NetworkType, VerboseLevel};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "hedera-local")]
#[command(about = "Run a local Hedera network (consensus node, mirror node, JSON-RPC relay)")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log verbosity
    #[arg(long, value_enum, default_value_t = VerboseLevel::Info, global = true)]
    pub verbose: VerboseLevel,

    /// Settings file (defaults to ./hedera-local.yml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Working directory for generated configuration and logs
    #[arg(long, global = true, env = "HEDERA_LOCAL_WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// Directory holding docker-compose.yml and compose-network/
    #[arg(long, global = true, env = "HEDERA_LOCAL_COMPOSE_ROOT", default_value = ".")]
    pub compose_root: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the local network
    #[command(disable_help_flag = true)]
    Start(StartArgs),

    /// Stop the local network and remove its containers, volumes and logs
    Stop,

    /// Stop, then start the local network
    #[command(disable_help_flag = true)]
    Restart(StartArgs),

    /// Create accounts on a running network
    #[command(disable_help_flag = true)]
    GenerateAccounts(AccountArgs),

    /// Parse the record file that holds a consensus timestamp
    Debug {
        /// Consensus timestamp, e.g. 1707081291.338308003
        timestamp: Option<String>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct AccountArgs {
    /// Number of accounts of each key type
    #[arg(default_value_t = 10)]
    pub accounts: u32,

    /// Create accounts concurrently
    #[arg(short = 'a', long = "async")]
    pub asynchronous: bool,

    /// Starting balance of each account, in hbar
    #[arg(long, default_value_t = 10_000)]
    pub balance: u64,

    /// Host the network is reachable on
    #[arg(short = 'h', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

impl Default for AccountArgs {
    fn default() -> Self {
        Self {
            accounts: 10,
            asynchronous: false,
            balance: 10_000,
            host: "127.0.0.1".to_string(),
            help: None,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct StartArgs {
    #[command(flatten)]
    pub accounts: AccountArgs,

    /// Return once the network is up instead of following its logs
    #[arg(short = 'd', long)]
    pub detached: bool,

    /// Network to imitate
    #[arg(short = 'n', long, value_enum, default_value_t = NetworkType::Local)]
    pub network: NetworkType,

    /// Keep the relay's rate limits enabled
    #[arg(short = 'l', long)]
    pub limits: bool,

    /// Run the relay in developer mode
    #[arg(long)]
    pub dev: bool,

    /// Start the full mirror node stack instead of the EVM-focused subset
    #[arg(long)]
    pub full: bool,

    /// Start four consensus nodes
    #[arg(long)]
    pub multinode: bool,

    /// Apply compose overrides from --composedir
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub usercompose: bool,

    /// Directory of compose override files
    #[arg(long, default_value = "./overrides/")]
    pub composedir: PathBuf,

    /// Enable account blocklisting in the relay
    #[arg(short = 'b', long)]
    pub blocklist: bool,

    /// Keep record streams locally so `debug` can parse them
    #[arg(long)]
    pub enable_debug: bool,

    /// Seed the accounts and tokens listed in initial-resources.yml
    #[arg(long)]
    pub create_initial_resources: bool,
}
