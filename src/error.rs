// ABOUTME: Application-wide error types for hedera-local.
// ABOUTME: Uses thiserror for ergonomic error handling.

use crate::runtime::RuntimeError;
use crate::services::LocatorError;
use crate::utils::LockError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("embedded configuration {name} is malformed: {source}")]
    EmbeddedConfig {
        name: &'static str,
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Locator(#[from] LocatorError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
