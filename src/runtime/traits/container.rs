// ABOUTME: Container listing for the runtime.
// ABOUTME: Used to resolve compose service containers by name.

use super::sealed::Sealed;
use crate::types::ContainerId;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait ContainerOps: Sealed + Send + Sync {
    /// List containers matching the given filters.
    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError>;
}

/// Filters for listing containers.
#[derive(Debug, Clone, Default)]
pub struct ContainerFilters {
    /// Filter by label (key=value).
    pub labels: HashMap<String, String>,
    /// Filter by name (partial match).
    pub name: Option<String>,
    /// Include stopped containers.
    pub all: bool,
}

impl ContainerFilters {
    pub fn by_name(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            all: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContainerSummary {
    pub id: ContainerId,
    /// Name without the leading slash.
    pub name: String,
    pub image: String,
    /// Lowercase state such as `running` or `exited`.
    pub state: String,
    pub status: String,
    pub labels: HashMap<String, String>,
}

impl ContainerSummary {
    /// Tag part of the image reference, or `latest` when untagged.
    pub fn image_tag(&self) -> &str {
        let name = self.image.rsplit('/').next().unwrap_or(&self.image);
        match name.split_once(':') {
            Some((_, tag)) => tag,
            None => "latest",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("runtime error: {0}")]
    Runtime(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(image: &str) -> ContainerSummary {
        ContainerSummary {
            id: ContainerId::new("abc"),
            name: "json-rpc-relay".to_string(),
            image: image.to_string(),
            state: "running".to_string(),
            status: "Up 2 minutes".to_string(),
            labels: HashMap::new(),
        }
    }

    #[test]
    fn image_tag_ignores_registry_port() {
        assert_eq!(summary("localhost:5000/hashgraph/relay:0.46.0").image_tag(), "0.46.0");
        assert_eq!(summary("localhost:5000/hashgraph/relay").image_tag(), "latest");
        assert_eq!(summary("haveged").image_tag(), "latest");
    }
}
