// ABOUTME: Paths inside the work directory the states read and write.
// ABOUTME: Compose sources live under the compose root; copies go to the work dir.

use std::path::{Path, PathBuf};

pub const NODE_CONFIG_DIR: &str = "compose-network/network-node/data/config";
pub const MIRROR_APPLICATION_YML: &str = "compose-network/mirror-node/application.yml";
pub const ENV_FILE: &str = "local-node.env";

#[derive(Debug, Clone)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn network_logs(&self) -> PathBuf {
        self.root.join("network-logs")
    }

    pub fn node_logs(&self) -> PathBuf {
        self.network_logs().join("node")
    }

    pub fn node_config(&self) -> PathBuf {
        self.root.join(NODE_CONFIG_DIR)
    }

    pub fn bootstrap_properties(&self) -> PathBuf {
        self.node_config().join("bootstrap.properties")
    }

    pub fn mirror_application(&self) -> PathBuf {
        self.root.join(MIRROR_APPLICATION_YML)
    }

    /// Environment handed to `docker compose`.
    pub fn env_file(&self) -> PathBuf {
        self.root.join(ENV_FILE)
    }

    pub fn record_streams(&self) -> PathBuf {
        self.node_logs().join("recordStreams").join("record0.0.3")
    }

    pub fn record_parser_temp(&self) -> PathBuf {
        self.root.join("record-parser").join("temp")
    }
}
