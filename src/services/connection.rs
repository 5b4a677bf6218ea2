// ABOUTME: TCP reachability probing for the network's service ports.
// ABOUTME: Polls a port within a bounded budget; repeated warnings are debounced.

use crate::config::ConnectionPolicy;
use crate::utils::Debounce;
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;

#[derive(Debug, thiserror::Error)]
#[error("Something went wrong, while trying to connect to port {port}")]
pub struct ConnectionError {
    pub port: u16,
}

#[async_trait]
pub trait ConnectionOps: Send + Sync {
    /// Wait until every port accepts connections, failing on the first one
    /// that does not within the budget.
    async fn wait_for_firing_up(&self, ports: &[u16]) -> Result<(), ConnectionError>;

    /// One probe of `port`.
    async fn check_connection(&self, port: u16) -> bool;
}

pub struct ConnectionService {
    host: String,
    policy: ConnectionPolicy,
    warnings: Debounce,
}

impl ConnectionService {
    pub fn new(host: impl Into<String>, policy: ConnectionPolicy, debounce: Duration) -> Self {
        Self {
            host: host.into(),
            policy,
            warnings: Debounce::new(debounce),
        }
    }

    /// At most `retries` probes with `interval` between them.
    async fn wait_for_port(&self, port: u16) -> Result<(), ConnectionError> {
        for attempt in 1..=self.policy.retries {
            if self.check_connection(port).await {
                tracing::debug!("Port {} is open after {} attempt(s)", port, attempt);
                return Ok(());
            }
            if attempt < self.policy.retries {
                tokio::time::sleep(self.policy.interval).await;
            }
        }
        Err(ConnectionError { port })
    }
}

#[async_trait]
impl ConnectionOps for ConnectionService {
    async fn wait_for_firing_up(&self, ports: &[u16]) -> Result<(), ConnectionError> {
        for &port in ports {
            tracing::info!("Waiting for port {} on {}", port, self.host);
            self.wait_for_port(port).await?;
        }
        Ok(())
    }

    async fn check_connection(&self, port: u16) -> bool {
        let connect = TcpStream::connect((self.host.as_str(), port));
        match tokio::time::timeout(self.policy.check_timeout, connect).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                self.warnings.call(|| {
                    tracing::warn!("Connection to {}:{} failed: {}", self.host, port, e)
                });
                false
            }
            Err(_) => {
                self.warnings.call(|| {
                    tracing::warn!("Connection to {}:{} timed out", self.host, port)
                });
                false
            }
        }
    }
}
