// ABOUTME: Runtime settings (hedera-local.yml) and embedded network configurations.
// ABOUTME: Settings are optional; every field has a default.

mod network;
mod node;
mod resources;

pub use network::{ConfigEntry, NetworkConfiguration};
pub(crate) use node::render_properties;
pub use node::{OriginalNodeConfiguration, TurboNodeProperties};
pub use resources::{InitialAccount, InitialResources, InitialToken, TokenType};

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "hedera-local.yml";
pub const CONFIG_FILENAME_ALT: &str = "hedera-local.yaml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub connection: ConnectionPolicy,
    pub retry: RetryPolicy,
    /// Window in which identical connection warnings are logged once.
    #[serde(with = "humantime_serde")]
    pub log_debounce: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            connection: ConnectionPolicy::default(),
            retry: RetryPolicy::default(),
            log_debounce: Duration::from_secs(5),
        }
    }
}

/// Budget for waiting on a service port: `retries` probes, `interval` apart.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionPolicy {
    pub retries: u32,
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    #[serde(with = "humantime_serde")]
    pub check_timeout: Duration,
}

impl Default for ConnectionPolicy {
    fn default() -> Self {
        Self {
            retries: 100,
            interval: Duration::from_millis(100),
            check_timeout: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub back_off: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            back_off: Duration::from_millis(500),
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load `explicit` if given (it must exist), otherwise the first settings
    /// file found in `dir`, otherwise defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::ConfigNotFound(path.to_path_buf()));
            }
            return Self::load(path);
        }

        let candidates = [dir.join(CONFIG_FILENAME), dir.join(CONFIG_FILENAME_ALT)];
        for path in &candidates {
            if path.exists() {
                tracing::debug!("Loading settings from {}", path.display());
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    fn validate(&self) -> Result<()> {
        if self.connection.retries == 0 {
            return Err(Error::InvalidConfig(
                "connection.retries must be at least 1".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::InvalidConfig(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
