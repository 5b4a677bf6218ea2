// ABOUTME: Network selection and log verbosity enums shared by the CLI and states.
// ABOUTME: Parsed by clap and deserialized from settings files.

use serde::Deserialize;
use std::fmt;

/// Which public network the local node imitates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    #[default]
    Local,
    Mainnet,
    Testnet,
    Previewnet,
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetworkType::Local => "local",
            NetworkType::Mainnet => "mainnet",
            NetworkType::Testnet => "testnet",
            NetworkType::Previewnet => "previewnet",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum VerboseLevel {
    #[default]
    Info,
    Trace,
}

impl VerboseLevel {
    /// Default tracing directive for this crate at this level.
    pub fn directive(self) -> &'static str {
        match self {
            VerboseLevel::Info => "hedera_local=info",
            VerboseLevel::Trace => "hedera_local=trace",
        }
    }
}
