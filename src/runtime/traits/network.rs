// ABOUTME: Network listing and removal for the runtime.
// ABOUTME: Backs the clean-up of compose-created networks.

use super::sealed::Sealed;
use crate::types::NetworkId;
use async_trait::async_trait;

#[async_trait]
pub trait NetworkOps: Sealed + Send + Sync {
    /// Networks whose name contains `name`.
    async fn list_networks(&self, name: &str) -> Result<Vec<NetworkSummary>, NetworkError>;

    async fn remove_network(&self, id: &NetworkId) -> Result<(), NetworkError>;
}

#[derive(Debug, Clone)]
pub struct NetworkSummary {
    pub id: NetworkId,
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("network not found: {0}")]
    NotFound(String),

    #[error("network in use, cannot remove: {0}")]
    InUse(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
