// ABOUTME: Accounts and tokens seeded by the resource creation phase.
// ABOUTME: Loaded from the embedded initial-resources.yml document.

use crate::error::{Error, Result};
use serde::Deserialize;

const INITIAL_RESOURCES: &str = include_str!("data/initial-resources.yml");

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitialResources {
    #[serde(default)]
    pub accounts: Vec<InitialAccount>,
    #[serde(default)]
    pub tokens: Vec<InitialToken>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitialAccount {
    /// Hex ECDSA key; the account is created through its EVM alias.
    pub private_key: String,
    /// Balance in whole hbar.
    pub balance: u64,
    /// Symbols of tokens to associate once they exist.
    #[serde(default)]
    pub associated_tokens: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    FungibleCommon,
    NonFungibleUnique,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitialToken {
    pub name: String,
    pub symbol: String,
    pub token_type: TokenType,
    #[serde(default)]
    pub decimals: u32,
    #[serde(default)]
    pub initial_supply: u64,
    #[serde(default)]
    pub max_supply: Option<u64>,
    #[serde(default)]
    pub memo: Option<String>,
}

impl InitialResources {
    pub fn load() -> Result<Self> {
        Self::from_yaml(INITIAL_RESOURCES)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|source| Error::EmbeddedConfig {
            name: "initial resources",
            source,
        })
    }
}
