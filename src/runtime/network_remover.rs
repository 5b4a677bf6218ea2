// ABOUTME: Removes the networks a previous run left behind, and nothing else.
// ABOUTME: Only `hedera-` networks with well-formed hex ids qualify.

use super::traits::{NetworkError, NetworkOps, NetworkSummary};
use crate::types::NetworkId;

pub const NETWORK_PREFIX: &str = "hedera-";

pub struct SafeNetworkRemover<'a, N: ?Sized> {
    runtime: &'a N,
}

impl<'a, N: NetworkOps + ?Sized> SafeNetworkRemover<'a, N> {
    pub fn new(runtime: &'a N) -> Self {
        Self { runtime }
    }

    /// Remove every qualifying network, returning the ids removed. A network
    /// that cannot be removed is logged and skipped.
    pub async fn remove_all(&self) -> Result<Vec<NetworkId>, NetworkError> {
        let candidates = self.runtime.list_networks(NETWORK_PREFIX).await?;
        let mut removed = Vec::new();
        for network in candidates.into_iter().filter(is_removable) {
            match self.runtime.remove_network(&network.id).await {
                Ok(()) => {
                    tracing::debug!("Removed network {} ({})", network.name, network.id);
                    removed.push(network.id);
                }
                Err(e) => tracing::warn!("Could not remove network {}: {}", network.name, e),
            }
        }
        Ok(removed)
    }
}

/// The name filter is a substring match, so the prefix is checked again here.
fn is_removable(network: &NetworkSummary) -> bool {
    network.name.starts_with(NETWORK_PREFIX) && is_network_id(network.id.as_str())
}

/// Short (12) or full (64) lowercase hex id.
fn is_network_id(id: &str) -> bool {
    matches!(id.len(), 12 | 64) && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
